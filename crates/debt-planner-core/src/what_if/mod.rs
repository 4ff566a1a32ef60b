//! What-if prepayment scenarios: appliers, composition and comparison metrics.

pub mod appliers;
pub mod composer;
pub mod metrics;
pub mod scenario;

use std::collections::BTreeMap;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use appliers::{
    apply_annual_lump_sum, apply_early_payment, apply_emi_increase, apply_extra_emi, place_early_payment,
};
pub use composer::{compose_scenarios, ComposedScenarios};
pub use metrics::{annotate_percentage_paid, compute_metrics, percentage_paid, ScenarioMetrics};
pub use scenario::{CompositionMode, ScenarioInput, ScenarioKind};

use crate::amortization::{generate_schedule, Loan, Schedule};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::DebtPlannerResult;

// ---------------------------------------------------------------------------
// Input / output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfInput {
    pub loan: Loan,
    #[serde(default)]
    pub scenarios: ScenarioInput,
    #[serde(default)]
    pub mode: CompositionMode,
}

/// A what-if schedule together with its comparison against the baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub applied_scenarios: Vec<String>,
    pub metrics: ScenarioMetrics,
    pub schedule: Schedule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfOutput {
    pub mode: CompositionMode,
    pub monthly_payment: Money,
    pub baseline_total_interest: Money,
    pub baseline_tenure: u32,
    /// Present in AND mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined: Option<ScenarioResult>,
    /// Present in OR mode, one entry per active scenario.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub independent: BTreeMap<ScenarioKind, ScenarioResult>,
    pub baseline: Schedule,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run a what-if request: baseline, composed scenarios and their metrics.
pub fn analyze_what_if(input: &WhatIfInput) -> DebtPlannerResult<ComputationOutput<WhatIfOutput>> {
    let start = Instant::now();
    let loan = &input.loan;

    let baseline = generate_schedule(loan, Decimal::ZERO)?;
    let composed = compose_scenarios(loan, &input.scenarios, input.mode)?;
    let warnings = collect_warnings(loan, &input.scenarios, &composed);

    let summarize = |schedule: Schedule| ScenarioResult {
        applied_scenarios: schedule
            .iter()
            .flat_map(|p| p.applied_scenarios.iter())
            .fold(Vec::new(), |mut acc: Vec<String>, label| {
                if !acc.contains(label) {
                    acc.push(label.clone());
                }
                acc
            }),
        metrics: compute_metrics(&baseline, &schedule, loan.principal),
        schedule,
    };

    let (combined, independent, methodology) = match composed {
        ComposedScenarios::Combined(schedule) => (
            Some(summarize(schedule)),
            BTreeMap::new(),
            "What-if amortization (combined scenarios)",
        ),
        ComposedScenarios::Independent(map) => (
            None,
            map.into_iter()
                .map(|(kind, schedule)| (kind, summarize(schedule)))
                .collect(),
            "What-if amortization (independent scenarios)",
        ),
    };

    let output = WhatIfOutput {
        mode: input.mode,
        monthly_payment: loan.monthly_payment()?,
        baseline_total_interest: baseline.total_interest(),
        baseline_tenure: baseline.tenure_months(),
        combined,
        independent,
        baseline,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

/// Checks the early payment against the schedule it was actually applied to:
/// in AND mode that schedule already carries the flat extras and may end
/// well before the baseline does.
fn collect_warnings(loan: &Loan, scenarios: &ScenarioInput, composed: &ComposedScenarios) -> Vec<String> {
    let mut warnings = Vec::new();

    if scenarios.active_kinds().is_empty() {
        warnings.push("No scenario inputs are active; results equal the baseline".into());
    }
    if let Some((amount, date)) = scenarios.early_payment_request() {
        let carrier = composed
            .combined()
            .or_else(|| composed.independent(ScenarioKind::EarlyPayment));
        let applied = carrier.map(|schedule| {
            schedule
                .iter()
                .find(|p| p.one_time_lump_sum_applied > Decimal::ZERO)
                .map(|p| (p.month, p.date))
        });
        match applied {
            Some(Some((month, booked))) if booked < date => warnings.push(format!(
                "Early payment date {date} falls after the final installment; applied at month {month}"
            )),
            Some(None) => warnings.push(format!(
                "Early payment dated {date} was not applied; the loan is retired before it falls due"
            )),
            _ => {}
        }
        if amount >= loan.principal {
            warnings.push(format!(
                "Early payment of {amount} is at least the loan principal; the loan is retired at once"
            ));
        }
    }
    if scenarios.annual_lump_sum >= loan.principal {
        warnings.push(format!(
            "Annual lump sum of {} is at least the loan principal",
            scenarios.annual_lump_sum
        ));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn loan() -> Loan {
        Loan::new(
            dec!(120_000),
            dec!(8.5),
            60,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        )
    }

    #[test]
    fn test_analyze_and_mode_reports_savings() {
        let input = WhatIfInput {
            loan: loan(),
            scenarios: ScenarioInput {
                extra_emi_count: 1,
                ..Default::default()
            },
            mode: CompositionMode::And,
        };
        let out = analyze_what_if(&input).unwrap();
        let combined = out.result.combined.as_ref().unwrap();

        assert!(out.result.independent.is_empty());
        assert_eq!(combined.applied_scenarios, vec!["Extra EMI"]);
        assert!(combined.metrics.savings > Decimal::ZERO);
        assert!(combined.metrics.tenure_difference > 0);
        assert_eq!(out.result.baseline_tenure, 60);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_analyze_or_mode_has_metrics_per_scenario() {
        let input = WhatIfInput {
            loan: loan(),
            scenarios: ScenarioInput {
                annual_lump_sum: dec!(8000),
                emi_increase_percent: dec!(10),
                ..Default::default()
            },
            mode: CompositionMode::Or,
        };
        let out = analyze_what_if(&input).unwrap();
        assert!(out.result.combined.is_none());
        assert_eq!(out.result.independent.len(), 2);
        for result in out.result.independent.values() {
            assert!(result.metrics.savings > Decimal::ZERO);
        }
    }

    #[test]
    fn test_analyze_warns_when_nothing_active() {
        let input = WhatIfInput {
            loan: loan(),
            scenarios: ScenarioInput::default(),
            mode: CompositionMode::And,
        };
        let out = analyze_what_if(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        let combined = out.result.combined.unwrap();
        assert_eq!(combined.metrics.savings, Decimal::ZERO);
    }

    #[test]
    fn test_analyze_warns_on_clamped_early_payment() {
        let input = WhatIfInput {
            loan: loan(),
            scenarios: ScenarioInput {
                early_payment: Some(dec!(500)),
                early_payment_date: NaiveDate::from_ymd_opt(2035, 1, 1),
                ..Default::default()
            },
            mode: CompositionMode::Or,
        };
        let out = analyze_what_if(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("after the final installment")));
    }

    #[test]
    fn test_and_mode_clamp_warning_follows_shortened_schedule() {
        // With 11 extra EMIs the combined schedule ends in May 2024, long
        // before the baseline's 2028 finish, so a 2027 payment is pulled back.
        let input = WhatIfInput {
            loan: loan(),
            scenarios: ScenarioInput {
                extra_emi_count: 11,
                early_payment: Some(dec!(500)),
                early_payment_date: NaiveDate::from_ymd_opt(2027, 1, 1),
                ..Default::default()
            },
            mode: CompositionMode::And,
        };
        let out = analyze_what_if(&input).unwrap();
        let combined = out.result.combined.as_ref().unwrap();
        let last = combined.schedule.last().unwrap();

        assert!(last.date < NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains(&format!("applied at month {}", last.month))));

        // The same request in OR mode lands inside the baseline: no warning.
        let or_input = WhatIfInput {
            mode: CompositionMode::Or,
            ..input
        };
        let out = analyze_what_if(&or_input).unwrap();
        assert!(!out.warnings.iter().any(|w| w.contains("final installment")));
    }

    #[test]
    fn test_what_if_input_from_json() {
        let json = r#"{
            "loan": {
                "principal": "120000",
                "annual_rate_percent": "8.5",
                "term_months": 60,
                "origination_date": "2024-01-15"
            },
            "scenarios": { "extra_emi_count": 2 },
            "mode": "OR"
        }"#;
        let input: WhatIfInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.mode, CompositionMode::Or);
        assert_eq!(input.scenarios.extra_emi_count, 2);
        assert_eq!(input.loan.principal, dec!(120_000));
    }
}
