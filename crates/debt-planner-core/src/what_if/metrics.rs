//! Summary figures derived from finished schedules.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::Schedule;
use crate::types::{Money, Percent};

/// Baseline-versus-what-if comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    /// Principal plus the baseline's total interest.
    pub original_outflow: Money,
    /// Principal plus the what-if schedule's total interest.
    pub modified_outflow: Money,
    pub savings: Money,
    /// Months saved; negative if the what-if runs longer.
    pub tenure_difference: i64,
    pub original_tenure: u32,
    pub reduced_tenure: u32,
}

/// Share of `principal` retired once the balance is `remaining`, as a
/// percentage clamped to [0, 100] and rounded to 2 dp.
pub fn percentage_paid(principal: Money, remaining: Money) -> Percent {
    if principal.is_zero() {
        return Decimal::ZERO;
    }
    let pct = (principal - remaining) / principal * dec!(100);
    pct.max(Decimal::ZERO).min(dec!(100)).round_dp(2)
}

/// Stamp `percentage_paid` on every period of `schedule`.
pub fn annotate_percentage_paid(schedule: &mut Schedule, principal: Money) {
    for period in schedule.periods.iter_mut() {
        period.percentage_paid = percentage_paid(principal, period.remaining_principal);
    }
}

/// Compare a what-if schedule with its baseline. An empty what-if schedule is
/// treated as "no change".
pub fn compute_metrics(baseline: &Schedule, what_if: &Schedule, principal: Money) -> ScenarioMetrics {
    let original_outflow = if baseline.is_empty() {
        Decimal::ZERO
    } else {
        baseline.total_interest() + principal
    };
    let (modified_outflow, reduced_tenure) = if what_if.is_empty() {
        (original_outflow, baseline.tenure_months())
    } else {
        (what_if.total_interest() + principal, what_if.tenure_months())
    };
    let original_tenure = baseline.tenure_months();

    ScenarioMetrics {
        original_outflow,
        modified_outflow,
        savings: original_outflow - modified_outflow,
        tenure_difference: i64::from(original_tenure) - i64::from(reduced_tenure),
        original_tenure,
        reduced_tenure,
    }
}
