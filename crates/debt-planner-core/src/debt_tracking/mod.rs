//! Tracking a live debt: recorded history replayed onto its schedule, and its
//! standing as of a date.

pub mod history;
pub mod status;

use std::time::Instant;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use history::{
    generate_tracked_schedule, DatedPayment, DebtHistory, RateChange, TrackedSchedule, TrackingOptions,
};
pub use status::{debt_status, elapsed_months, DebtStatus};

use crate::amortization::{Loan, Schedule};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::what_if::annotate_percentage_paid;
use crate::DebtPlannerResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtTrackingInput {
    pub loan: Loan,
    #[serde(default)]
    pub history: DebtHistory,
    #[serde(default)]
    pub options: TrackingOptions,
    /// Status date; today when omitted.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtTrackingOutput {
    /// Contractual EMI at origination, before history.
    pub monthly_payment: Money,
    pub tenure_months: u32,
    pub total_interest: Money,
    pub total_payment: Money,
    pub status: DebtStatus,
    pub schedule: Schedule,
}

/// Replay a debt's history and report where it stands.
pub fn analyze_debt(input: &DebtTrackingInput) -> DebtPlannerResult<ComputationOutput<DebtTrackingOutput>> {
    let start = Instant::now();
    let loan = &input.loan;
    let as_of = input
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let tracked = generate_tracked_schedule(loan, &input.history, &input.options)?;
    let mut schedule = tracked.schedule;
    annotate_percentage_paid(&mut schedule, loan.principal);

    let mut warnings = Vec::new();
    if input.options.ignore_history && !input.history.is_empty() {
        warnings.push("Recorded history ignored; schedule follows the original contract".into());
    }
    for payment in &tracked.unapplied_payments {
        warnings.push(format!(
            "Payment of {} on {} falls after the final installment and was not applied",
            payment.amount, payment.date
        ));
    }
    for change in &tracked.unapplied_rate_changes {
        warnings.push(format!(
            "Rate change to {}% on {} falls after the final installment and was not applied",
            change.annual_rate_percent, change.date
        ));
    }
    let recorded: Money = input
        .history
        .payments
        .iter()
        .filter(|_| !input.options.ignore_history)
        .map(|p| p.amount)
        .sum();
    let unapplied: Money = tracked.unapplied_payments.iter().map(|p| p.amount).sum();
    let applied: Money = schedule.iter().map(|p| p.one_time_lump_sum_applied).sum();
    if applied < recorded - unapplied {
        warnings.push(format!(
            "Recorded payments exceed the outstanding balance; only {applied} was applied"
        ));
    }

    let status = debt_status(loan, &schedule, as_of);
    log::debug!(
        "debt tracked to {as_of}: {} of {} months elapsed, {}% repaid",
        status.elapsed_months,
        schedule.tenure_months(),
        status.progress_percentage
    );

    let output = DebtTrackingOutput {
        monthly_payment: loan.monthly_payment()?,
        tenure_months: schedule.tenure_months(),
        total_interest: schedule.total_interest(),
        total_payment: schedule.total_payment(),
        status,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Tracked amortization with payment and rate history",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input() -> DebtTrackingInput {
        DebtTrackingInput {
            loan: Loan::new(dec!(18_000), dec!(9), 36, date(2024, 2, 1)),
            history: DebtHistory {
                payments: vec![DatedPayment {
                    amount: dec!(1500),
                    date: date(2024, 6, 15),
                }],
                rate_changes: vec![RateChange {
                    annual_rate_percent: dec!(7.5),
                    date: date(2025, 2, 1),
                }],
            },
            options: TrackingOptions::default(),
            as_of: Some(date(2025, 8, 3)),
        }
    }

    #[test]
    fn test_analyze_debt_reports_status() {
        let out = analyze_debt(&input()).unwrap();
        let result = &out.result;

        assert!(out.warnings.is_empty());
        assert_eq!(result.status.elapsed_months, 18);
        assert_eq!(
            result.status.principal_pending,
            result.schedule.periods[17].remaining_principal
        );
        assert_eq!(
            result.status.progress_percentage,
            result.schedule.periods[17].percentage_paid
        );
        // The rate change re-spreads the reduced balance over the rest of the term.
        assert_eq!(result.tenure_months, 36);
        let base = crate::amortization::generate_schedule(&input().loan, Decimal::ZERO).unwrap();
        assert!(result.total_interest < base.total_interest());
        assert_eq!(
            result.total_payment,
            dec!(18_000) + result.total_interest
        );
    }

    #[test]
    fn test_analyze_debt_warns_on_late_events() {
        let mut input = input();
        input.history.payments.push(DatedPayment {
            amount: dec!(99),
            date: date(2031, 1, 1),
        });
        let out = analyze_debt(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("not applied"));
    }

    #[test]
    fn test_analyze_debt_warns_on_overpayment() {
        let mut input = input();
        input.history.payments = vec![DatedPayment {
            amount: dec!(50_000),
            date: date(2024, 3, 1),
        }];
        let out = analyze_debt(&input).unwrap();
        assert!(out.result.schedule.is_paid_off());
        assert_eq!(out.result.tenure_months, 2);
        assert!(out.warnings.iter().any(|w| w.contains("exceed")));
    }

    #[test]
    fn test_analyze_debt_ignoring_history() {
        let mut input = input();
        input.options.ignore_history = true;
        let out = analyze_debt(&input).unwrap();
        assert_eq!(out.result.tenure_months, 36);
        assert_eq!(out.warnings.len(), 1);
        assert!(out
            .result
            .schedule
            .iter()
            .all(|p| p.one_time_lump_sum_applied == Decimal::ZERO));
    }

    #[test]
    fn test_input_from_json_with_defaults() {
        let json = r#"{
            "loan": {
                "principal": 18000,
                "annual_rate_percent": 9,
                "term_months": 36,
                "origination_date": "2024-02-01"
            },
            "history": { "payments": [ { "amount": "250.50", "date": "2024-05-01" } ] }
        }"#;
        let input: DebtTrackingInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.history.payments[0].amount, dec!(250.50));
        assert!(input.history.rate_changes.is_empty());
        assert!(input.as_of.is_none());
        assert!(!input.options.ignore_history);
    }
}
