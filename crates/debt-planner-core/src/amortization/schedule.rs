//! Amortization schedules: period rows, the schedule container and the
//! base schedule generator.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::loan::Loan;
use super::recurrence::{amortize, PeriodTerms};
use crate::error::DebtPlannerError;
use crate::types::{round_money, validate_amount, with_metadata, ComputationOutput, Money, Percent};
use crate::DebtPlannerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One row of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodEntry {
    /// 1-based installment number.
    pub month: u32,
    pub date: NaiveDate,
    /// Total paid this period, including any lump sums.
    pub payment: Money,
    /// Principal retired this period, including any lump sums.
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_principal: Money,
    pub cumulative_interest_paid: Money,
    #[serde(default)]
    pub annual_lump_sum_applied: Money,
    #[serde(default)]
    pub one_time_lump_sum_applied: Money,
    #[serde(default)]
    pub percentage_paid: Percent,
    #[serde(default)]
    pub applied_scenarios: Vec<String>,
}

impl PeriodEntry {
    /// The recurring part of this period's payment, net of lump sums.
    pub fn regular_installment(&self) -> Money {
        self.payment - self.annual_lump_sum_applied - self.one_time_lump_sum_applied
    }

    /// Balance outstanding before this period's payment.
    pub fn opening_principal(&self) -> Money {
        self.remaining_principal + self.principal_portion
    }

    /// Appends `label` unless it is already present, keeping insertion order.
    pub fn add_scenario(&mut self, label: &str) {
        if !self.applied_scenarios.iter().any(|l| l == label) {
            self.applied_scenarios.push(label.to_string());
        }
    }
}

/// An ordered, finite run of periods ending at payoff or at the loan term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    pub periods: Vec<PeriodEntry>,
}

impl From<Vec<PeriodEntry>> for Schedule {
    fn from(periods: Vec<PeriodEntry>) -> Self {
        Schedule { periods }
    }
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn last(&self) -> Option<&PeriodEntry> {
        self.periods.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PeriodEntry> {
        self.periods.iter()
    }

    /// Number of installments until the balance reaches zero (or the term ends).
    pub fn tenure_months(&self) -> u32 {
        self.periods.len() as u32
    }

    pub fn total_interest(&self) -> Money {
        self.last()
            .map(|p| p.cumulative_interest_paid)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total_payment(&self) -> Money {
        self.periods.iter().map(|p| p.payment).sum()
    }

    pub fn final_balance(&self) -> Money {
        self.last()
            .map(|p| p.remaining_principal)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn is_paid_off(&self) -> bool {
        !self.is_empty() && self.final_balance().is_zero()
    }

    /// Adds `label` to every period matching `predicate`.
    pub fn label_where<F>(&mut self, label: &str, predicate: F)
    where
        F: Fn(&PeriodEntry) -> bool,
    {
        for period in self.periods.iter_mut().filter(|p| predicate(p)) {
            period.add_scenario(label);
        }
    }

    pub fn label_all(&mut self, label: &str) {
        self.label_where(label, |_| true);
    }
}

// ---------------------------------------------------------------------------
// Base schedule generator
// ---------------------------------------------------------------------------

/// Generate the canonical monthly schedule for `loan`, with `flat_extra_payment`
/// added to every installment. Stops the period the balance reaches zero.
pub fn generate_schedule(loan: &Loan, flat_extra_payment: Money) -> DebtPlannerResult<Schedule> {
    loan.validate()?;
    validate_amount("flat_extra_payment", flat_extra_payment)?;

    let installment = loan
        .monthly_payment()?
        .checked_add(round_money(flat_extra_payment))
        .ok_or_else(|| DebtPlannerError::scenario_overflow("flat_extra_payment"))?;
    let monthly_rate = loan.monthly_rate();

    amortize(
        loan,
        Vec::new(),
        1,
        loan.term_months,
        |_, _| Ok(PeriodTerms::level(installment, monthly_rate)),
    )
}

// ---------------------------------------------------------------------------
// Envelope entry point
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub loan: Loan,
    #[serde(default)]
    pub flat_extra_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub monthly_payment: Money,
    pub tenure_months: u32,
    pub total_interest: Money,
    pub total_payment: Money,
    pub schedule: Schedule,
}

/// Build the base schedule for a loan, wrapped in the standard envelope.
pub fn analyze_schedule(input: &ScheduleInput) -> DebtPlannerResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let schedule = generate_schedule(&input.loan, input.flat_extra_payment)?;
    let monthly_payment = input.loan.monthly_payment()?;

    if input.flat_extra_payment > Decimal::ZERO && schedule.tenure_months() < input.loan.term_months {
        warnings.push(format!(
            "Extra payment of {} retires the loan {} months early",
            round_money(input.flat_extra_payment),
            input.loan.term_months - schedule.tenure_months()
        ));
    }

    let output = ScheduleOutput {
        monthly_payment,
        tenure_months: schedule.tenure_months(),
        total_interest: schedule.total_interest(),
        total_payment: schedule.total_payment(),
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization (cent-exact ledger)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
