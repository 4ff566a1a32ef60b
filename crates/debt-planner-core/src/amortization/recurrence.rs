//! The single period recurrence every schedule in the crate is built from.
//!
//! A schedule is produced by walking months forward from an opening balance,
//! asking a payment plan what each period must pay, and booking the result on
//! a cent-exact ledger: interest is rounded from the opening balance, principal
//! is payment less interest, and the balance never goes below zero. Scenario
//! appliers are plans layered over an existing schedule via [`rederive_from`].

use rust_decimal::Decimal;

use super::loan::Loan;
use super::schedule::{PeriodEntry, Schedule};
use crate::error::DebtPlannerError;
use crate::types::{round_money, Money, Rate};
use crate::DebtPlannerResult;

/// Upper bound on periods walked per pass, as a multiple of the loan term.
pub const ITERATION_CAP_MULTIPLIER: u32 = 2;

/// What a single period is asked to pay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodTerms {
    /// Recurring installment (EMI plus any flat extra).
    pub installment: Money,
    pub monthly_rate: Rate,
    /// Anniversary lump sum applied against principal.
    pub annual_lump_sum: Money,
    /// One-time prepayment applied against principal.
    pub one_time_payment: Money,
}

impl PeriodTerms {
    pub fn level(installment: Money, monthly_rate: Rate) -> Self {
        PeriodTerms {
            installment,
            monthly_rate,
            annual_lump_sum: Decimal::ZERO,
            one_time_payment: Decimal::ZERO,
        }
    }

    /// Terms that reproduce `period` as it was originally booked.
    pub fn carried(period: &PeriodEntry, monthly_rate: Rate) -> Self {
        PeriodTerms {
            installment: period.regular_installment(),
            monthly_rate,
            annual_lump_sum: period.annual_lump_sum_applied,
            one_time_payment: period.one_time_lump_sum_applied,
        }
    }
}

/// Book months `first_month..=last_month` onto `periods`, stopping early the
/// period the balance reaches zero.
///
/// The opening balance is the last booked period's closing balance, or the
/// loan principal when `periods` is empty. `plan` receives the month and its
/// opening balance. In the loan's final contractual month the installment is
/// trued up to settle whatever balance rounding has left behind.
pub(crate) fn amortize<F>(
    loan: &Loan,
    mut periods: Vec<PeriodEntry>,
    first_month: u32,
    last_month: u32,
    mut plan: F,
) -> DebtPlannerResult<Schedule>
where
    F: FnMut(u32, Money) -> DebtPlannerResult<PeriodTerms>,
{
    let (mut balance, mut cumulative_interest) = match periods.last() {
        Some(p) => (p.remaining_principal, p.cumulative_interest_paid),
        None => (round_money(loan.principal), Decimal::ZERO),
    };

    let limit = loan.term_months.saturating_mul(ITERATION_CAP_MULTIPLIER);
    let mut iterations: u32 = 0;
    let mut month = first_month;

    while month <= last_month && balance > Decimal::ZERO {
        iterations += 1;
        if iterations > limit {
            return Err(DebtPlannerError::IterationLimit { limit });
        }

        let terms = plan(month, balance)?;
        let interest = balance
            .checked_mul(terms.monthly_rate)
            .map(round_money)
            .ok_or_else(|| DebtPlannerError::loan_overflow("principal"))?;
        let installment = round_money(terms.installment);

        // Prepayments retire principal first; the installment covers the rest.
        let annual = clamp_prepayment(terms.annual_lump_sum, balance);
        let one_time = clamp_prepayment(terms.one_time_payment, balance - annual);
        let outstanding = balance - annual - one_time;

        if outstanding > Decimal::ZERO && installment <= interest {
            return Err(DebtPlannerError::NegativeAmortization {
                month,
                payment: installment,
                interest,
            });
        }

        let scheduled = if month == loan.term_months {
            outstanding
        } else {
            (installment - interest).min(outstanding)
        };

        let principal = scheduled + annual + one_time;
        balance -= principal;
        let payment = principal
            .checked_add(interest)
            .ok_or_else(|| DebtPlannerError::loan_overflow("principal"))?;
        cumulative_interest = cumulative_interest
            .checked_add(interest)
            .ok_or_else(|| DebtPlannerError::loan_overflow("principal"))?;

        periods.push(PeriodEntry {
            month,
            date: loan.period_date(month)?,
            payment,
            principal_portion: principal,
            interest_portion: interest,
            remaining_principal: balance,
            cumulative_interest_paid: cumulative_interest,
            annual_lump_sum_applied: annual,
            one_time_lump_sum_applied: one_time,
            percentage_paid: Decimal::ZERO,
            applied_scenarios: Vec::new(),
        });

        month += 1;
    }

    Ok(Schedule::from(periods))
}

fn clamp_prepayment(requested: Money, available: Money) -> Money {
    round_money(requested).max(Decimal::ZERO).min(available)
}

/// Re-derive `template` from `start_month` forward.
///
/// Periods before `start_month` are copied verbatim; from there on `plan` is
/// consulted with the template's own row for that month, so a plan can carry
/// or adjust what was originally booked. The result never outlives the
/// template and is truncated the period the balance reaches zero. Scenario
/// labels are carried from the template rows.
pub(crate) fn rederive_from<F>(
    loan: &Loan,
    template: &Schedule,
    start_month: u32,
    mut plan: F,
) -> DebtPlannerResult<Schedule>
where
    F: FnMut(&PeriodEntry, Money) -> DebtPlannerResult<PeriodTerms>,
{
    let keep = (start_month.saturating_sub(1) as usize).min(template.len());
    let prefix = template.periods[..keep].to_vec();
    let last_month = template.len() as u32;

    let mut schedule = amortize(loan, prefix, start_month.max(1), last_month, |month, balance| {
        plan(&template.periods[(month - 1) as usize], balance)
    })?;

    for (period, source) in schedule.periods.iter_mut().zip(template.iter()).skip(keep) {
        period.applied_scenarios = source.applied_scenarios.clone();
    }
    Ok(schedule)
}
