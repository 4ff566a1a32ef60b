//! Loan parameters and the calendar the schedule runs on.

use std::time::Instant;

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DebtPlannerError;
use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::DebtPlannerResult;

/// An amortizing loan. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    /// Amount borrowed.
    pub principal: Money,
    /// Annual interest rate as a percentage (8.5 = 8.5%).
    pub annual_rate_percent: Percent,
    /// Contractual term in months.
    pub term_months: u32,
    /// Date of the first installment; later installments fall on the same
    /// day of each following month (clamped to month end).
    pub origination_date: NaiveDate,
}

impl Loan {
    pub fn new(
        principal: Money,
        annual_rate_percent: Percent,
        term_months: u32,
        origination_date: NaiveDate,
    ) -> Self {
        Loan {
            principal,
            annual_rate_percent,
            term_months,
            origination_date,
        }
    }

    pub fn validate(&self) -> DebtPlannerResult<()> {
        time_value::validate_loan_terms(self.principal, self.annual_rate_percent, self.term_months)
    }

    pub fn monthly_rate(&self) -> Rate {
        time_value::monthly_rate(self.annual_rate_percent)
    }

    /// The standard EMI, rounded to cents.
    pub fn monthly_payment(&self) -> DebtPlannerResult<Money> {
        time_value::emi(self.principal, self.annual_rate_percent, self.term_months)
    }

    /// Calendar date of the 1-based installment `month`.
    pub fn period_date(&self, month: u32) -> DebtPlannerResult<NaiveDate> {
        let offset = month.saturating_sub(1);
        self.origination_date
            .checked_add_months(Months::new(offset))
            .ok_or_else(|| {
                DebtPlannerError::DateError(format!(
                    "installment {month} falls outside the supported calendar range"
                ))
            })
    }

    /// First installment month dated on or after `date`, if any within the term.
    pub fn first_month_on_or_after(&self, date: NaiveDate) -> DebtPlannerResult<Option<u32>> {
        for month in 1..=self.term_months {
            if self.period_date(month)? >= date {
                return Ok(Some(month));
            }
        }
        Ok(None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiOutput {
    pub monthly_payment: Money,
    pub monthly_rate: Rate,
    /// EMI times term, before the final-period true-up.
    pub nominal_total_payment: Money,
    pub nominal_total_interest: Money,
}

/// EMI for `loan` in the standard envelope.
pub fn analyze_emi(loan: &Loan) -> DebtPlannerResult<ComputationOutput<EmiOutput>> {
    let start = Instant::now();
    loan.validate()?;

    let monthly_payment = loan.monthly_payment()?;
    let nominal_total_payment = monthly_payment * Decimal::from(loan.term_months);
    let output = EmiOutput {
        monthly_payment,
        monthly_rate: loan.monthly_rate(),
        nominal_total_payment,
        nominal_total_interest: nominal_total_payment - loan.principal,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Equated monthly installment (level annuity)",
        loan,
        Vec::new(),
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_loan() -> Loan {
        Loan::new(dec!(10_000), dec!(6), 24, date(2024, 1, 31))
    }

    #[test]
    fn test_period_dates_advance_by_calendar_month() {
        let loan = sample_loan();
        assert_eq!(loan.period_date(1).unwrap(), date(2024, 1, 31));
        // Leap-year February clamps to the 29th
        assert_eq!(loan.period_date(2).unwrap(), date(2024, 2, 29));
        assert_eq!(loan.period_date(3).unwrap(), date(2024, 3, 31));
        assert_eq!(loan.period_date(13).unwrap(), date(2025, 1, 31));
    }

    #[test]
    fn test_first_month_on_or_after() {
        let loan = sample_loan();
        assert_eq!(loan.first_month_on_or_after(date(2023, 6, 1)).unwrap(), Some(1));
        assert_eq!(loan.first_month_on_or_after(date(2024, 3, 1)).unwrap(), Some(3));
        assert_eq!(loan.first_month_on_or_after(date(2024, 3, 31)).unwrap(), Some(3));
        assert_eq!(loan.first_month_on_or_after(date(2030, 1, 1)).unwrap(), None);
    }

    #[test]
    fn test_validate_rejects_each_field() {
        let mut loan = sample_loan();
        loan.principal = dec!(-1);
        assert!(loan.validate().is_err());

        let mut loan = sample_loan();
        loan.term_months = 0;
        assert!(loan.validate().is_err());

        let mut loan = sample_loan();
        loan.annual_rate_percent = dec!(-0.5);
        assert!(loan.validate().is_err());

        assert!(sample_loan().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_loans() {
        let loan = Loan::new(dec!(1000), dec!(0), u32::MAX, date(2024, 1, 1));
        assert!(matches!(
            loan.validate(),
            Err(DebtPlannerError::InvalidLoanParameters { ref field, .. }) if field == "term_months"
        ));

        let loan = Loan::new(
            dec!(50_000_000_000_000_000_000_000_000_000),
            dec!(2400),
            12,
            date(2024, 1, 1),
        );
        assert!(matches!(
            loan.monthly_payment(),
            Err(DebtPlannerError::InvalidLoanParameters { ref field, .. }) if field == "principal"
        ));
    }

    #[test]
    fn test_analyze_emi() {
        let loan = Loan::new(dec!(120_000), dec!(8.5), 60, date(2024, 1, 1));
        let out = analyze_emi(&loan).unwrap();
        assert_eq!(out.result.monthly_payment, dec!(2461.98));
        assert_eq!(out.result.nominal_total_payment, dec!(147_718.80));
        assert_eq!(out.result.nominal_total_interest, dec!(27_718.80));
        assert!(out.warnings.is_empty());

        let bad = Loan::new(dec!(0), dec!(8.5), 60, date(2024, 1, 1));
        assert!(analyze_emi(&bad).is_err());
    }
}
