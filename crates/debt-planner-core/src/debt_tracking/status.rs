//! Where a debt stands on a given date.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{Loan, Schedule};
use crate::types::{round_money, Money, Percent};
use crate::what_if::percentage_paid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtStatus {
    pub as_of: NaiveDate,
    /// Installments counted as made by `as_of`.
    pub elapsed_months: u32,
    /// Installments still scheduled after `as_of`.
    pub remaining_months: u32,
    pub principal_paid: Money,
    pub principal_pending: Money,
    pub interest_paid: Money,
    pub interest_pending: Money,
    pub progress_percentage: Percent,
    /// First installment dated after `as_of`.
    pub next_payment_date: Option<NaiveDate>,
    pub is_paid_off: bool,
}

/// Whole calendar months from `origination` to `as_of`, clamped to `[0, term]`.
/// Days of the month are ignored.
pub fn elapsed_months(origination: NaiveDate, as_of: NaiveDate, term_months: u32) -> u32 {
    let diff = (i64::from(as_of.year()) - i64::from(origination.year())) * 12
        + i64::from(as_of.month())
        - i64::from(origination.month());
    diff.clamp(0, i64::from(term_months)) as u32
}

/// Split `schedule` at `as_of` into what has been paid and what is pending.
pub fn debt_status(loan: &Loan, schedule: &Schedule, as_of: NaiveDate) -> DebtStatus {
    let elapsed = elapsed_months(loan.origination_date, as_of, loan.term_months);
    let (paid, pending) = schedule
        .periods
        .split_at((elapsed as usize).min(schedule.len()));

    let principal_paid: Money = paid.iter().map(|p| p.principal_portion).sum();
    let interest_paid: Money = paid.iter().map(|p| p.interest_portion).sum();
    let interest_pending: Money = pending.iter().map(|p| p.interest_portion).sum();
    let principal_pending = (round_money(loan.principal) - principal_paid).max(Decimal::ZERO);

    DebtStatus {
        as_of,
        elapsed_months: elapsed,
        remaining_months: pending.len() as u32,
        principal_paid,
        principal_pending,
        interest_paid,
        interest_pending,
        progress_percentage: percentage_paid(loan.principal, principal_pending),
        next_payment_date: schedule.iter().map(|p| p.date).find(|d| *d > as_of),
        is_paid_off: pending.is_empty() && principal_pending.is_zero(),
    }
}
