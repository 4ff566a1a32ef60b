//! Replaying a debt's recorded payments and rate changes onto its schedule.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::recurrence::amortize;
use crate::amortization::{Loan, PeriodTerms, Schedule};
use crate::error::DebtPlannerError;
use crate::time_value::{level_payment, monthly_rate, MAX_ANNUAL_RATE_PERCENT};
use crate::types::{round_money, validate_amount, Money, Percent, MAX_AMOUNT};
use crate::DebtPlannerResult;

pub const RECORDED_PAYMENT_LABEL: &str = "Recorded Payment";
pub const RATE_CHANGE_LABEL: &str = "Rate Change";

/// An ad-hoc payment made against the debt on `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedPayment {
    pub amount: Money,
    pub date: NaiveDate,
}

/// A new annual rate taking effect on `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateChange {
    pub annual_rate_percent: Percent,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebtHistory {
    pub payments: Vec<DatedPayment>,
    pub rate_changes: Vec<RateChange>,
}

impl DebtHistory {
    pub fn is_empty(&self) -> bool {
        self.payments.is_empty() && self.rate_changes.is_empty()
    }

    pub fn validate(&self) -> DebtPlannerResult<()> {
        for payment in &self.payments {
            if payment.amount <= Decimal::ZERO || payment.amount > MAX_AMOUNT {
                return Err(DebtPlannerError::scenario(
                    "history.payments.amount",
                    format!(
                        "Payment on {} must be greater than zero and at most {MAX_AMOUNT}",
                        payment.date
                    ),
                ));
            }
        }
        for change in &self.rate_changes {
            if change.annual_rate_percent < Decimal::ZERO
                || change.annual_rate_percent > MAX_ANNUAL_RATE_PERCENT
            {
                return Err(DebtPlannerError::scenario(
                    "history.rate_changes.annual_rate_percent",
                    format!(
                        "Rate change on {} must be between 0 and {MAX_ANNUAL_RATE_PERCENT}%",
                        change.date
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingOptions {
    /// Flat amount added to every installment.
    pub extra_payment: Money,
    /// Amortize the contract as written, disregarding recorded history.
    pub ignore_history: bool,
}

/// A schedule replayed with history, plus the events that fell past its end.
#[derive(Debug, Clone)]
pub struct TrackedSchedule {
    pub schedule: Schedule,
    pub unapplied_payments: Vec<DatedPayment>,
    pub unapplied_rate_changes: Vec<RateChange>,
}

/// Build the schedule a debt actually follows given its recorded history.
///
/// Each payment is applied against principal in the first period dated on or
/// after it. A rate change switches the monthly rate from the first period on
/// or after its date and re-derives the installment as the level payment of
/// the balance then outstanding over the months left in the term.
pub fn generate_tracked_schedule(
    loan: &Loan,
    history: &DebtHistory,
    options: &TrackingOptions,
) -> DebtPlannerResult<TrackedSchedule> {
    loan.validate()?;
    validate_amount("options.extra_payment", options.extra_payment)?;

    let empty = DebtHistory::default();
    let history = if options.ignore_history { &empty } else { history };
    history.validate()?;

    let mut payments = history.payments.clone();
    payments.sort_by_key(|p| p.date);
    let mut rate_changes = history.rate_changes.clone();
    rate_changes.sort_by_key(|c| c.date);

    let mut payment_months: BTreeMap<u32, Money> = BTreeMap::new();
    let mut unapplied_payments = Vec::new();
    for payment in payments {
        match loan.first_month_on_or_after(payment.date)? {
            Some(month) => {
                let total = payment_months.entry(month).or_default();
                *total = total
                    .checked_add(round_money(payment.amount))
                    .ok_or_else(|| DebtPlannerError::scenario_overflow("history.payments.amount"))?;
            }
            None => unapplied_payments.push(payment),
        }
    }

    // Changes landing on the same period collapse to the latest one.
    let mut rate_months: BTreeMap<u32, Percent> = BTreeMap::new();
    let mut unapplied_rate_changes = Vec::new();
    for change in rate_changes {
        match loan.first_month_on_or_after(change.date)? {
            Some(month) => {
                rate_months.insert(month, change.annual_rate_percent);
            }
            None => unapplied_rate_changes.push(change),
        }
    }

    let extra = round_money(options.extra_payment);
    let term = loan.term_months;
    let mut rate = loan.monthly_rate();
    let mut installment = loan
        .monthly_payment()?
        .checked_add(extra)
        .ok_or_else(|| DebtPlannerError::scenario_overflow("options.extra_payment"))?;

    let mut schedule = amortize(loan, Vec::new(), 1, term, |month, balance| {
        if let Some(pct) = rate_months.get(&month) {
            rate = monthly_rate(*pct);
            installment = level_payment(balance, rate, term - month + 1)
                .and_then(|level| round_money(level).checked_add(extra))
                .ok_or_else(|| {
                    DebtPlannerError::scenario_overflow("history.rate_changes.annual_rate_percent")
                })?;
            log::debug!("rate change to {pct}% at month {month}; installment now {installment}");
        }
        Ok(PeriodTerms {
            one_time_payment: payment_months.get(&month).copied().unwrap_or_default(),
            ..PeriodTerms::level(installment, rate)
        })
    })?;

    schedule.label_where(RECORDED_PAYMENT_LABEL, |p| payment_months.contains_key(&p.month));
    schedule.label_where(RATE_CHANGE_LABEL, |p| rate_months.contains_key(&p.month));

    Ok(TrackedSchedule {
        schedule,
        unapplied_payments,
        unapplied_rate_changes,
    })
}
