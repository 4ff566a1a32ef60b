use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::DebtPlannerError;
use crate::types::{round_money, Money, Percent, Rate, MAX_AMOUNT};
use crate::DebtPlannerResult;

pub const MONTHS_PER_YEAR: u32 = 12;

/// Longest contractual term accepted (100 years).
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Highest annual rate accepted, as a percentage.
pub const MAX_ANNUAL_RATE_PERCENT: Percent = dec!(10_000);

/// Convert an annual percentage (8.5 = 8.5%) into a monthly decimal rate.
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / dec!(100) / Decimal::from(MONTHS_PER_YEAR)
}

/// (1 + r)^n, or `None` when the factor overflows 128-bit decimal range.
pub fn compound_factor(rate: Rate, periods: u32) -> Option<Decimal> {
    (Decimal::ONE + rate).checked_powu(u64::from(periods))
}

/// Level payment that retires `balance` over `periods` at `rate`, unrounded.
///
/// When the compounding factor overflows, the annuity ratio f/(f-1) has
/// collapsed to 1 and the payment is pure interest. `None` when the payment
/// itself does not fit in 128-bit decimal range.
pub(crate) fn level_payment(balance: Money, rate: Rate, periods: u32) -> Option<Money> {
    if periods == 0 {
        return Some(balance);
    }
    if rate.is_zero() {
        return Some(balance / Decimal::from(periods));
    }

    match compound_factor(rate, periods) {
        Some(factor) if factor > Decimal::ONE => {
            let annuity = factor.checked_div(factor - Decimal::ONE)?;
            balance.checked_mul(rate)?.checked_mul(annuity)
        }
        Some(_) => Some(balance / Decimal::from(periods)),
        None => balance.checked_mul(rate),
    }
}

/// Range checks shared by [`emi`] and `Loan::validate`.
pub(crate) fn validate_loan_terms(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> DebtPlannerResult<()> {
    if principal <= Decimal::ZERO {
        return Err(DebtPlannerError::loan(
            "principal",
            "Principal must be greater than zero",
        ));
    }
    if principal > MAX_AMOUNT {
        return Err(DebtPlannerError::loan(
            "principal",
            format!("Principal cannot exceed {MAX_AMOUNT}"),
        ));
    }
    if term_months == 0 {
        return Err(DebtPlannerError::loan(
            "term_months",
            "Term must be at least one month",
        ));
    }
    if term_months > MAX_TERM_MONTHS {
        return Err(DebtPlannerError::loan(
            "term_months",
            format!("Term cannot exceed {MAX_TERM_MONTHS} months"),
        ));
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(DebtPlannerError::loan(
            "annual_rate_percent",
            "Interest rate cannot be negative",
        ));
    }
    if annual_rate_percent > MAX_ANNUAL_RATE_PERCENT {
        return Err(DebtPlannerError::loan(
            "annual_rate_percent",
            format!("Interest rate cannot exceed {MAX_ANNUAL_RATE_PERCENT}%"),
        ));
    }
    Ok(())
}

/// Equated Monthly Installment for a principal/annual-rate/term triple,
/// rounded to cents.
pub fn emi(principal: Money, annual_rate_percent: Percent, term_months: u32) -> DebtPlannerResult<Money> {
    validate_loan_terms(principal, annual_rate_percent, term_months)?;

    let rate = monthly_rate(annual_rate_percent);
    level_payment(principal, rate, term_months)
        .map(round_money)
        .ok_or_else(|| DebtPlannerError::loan_overflow("principal"))
}
