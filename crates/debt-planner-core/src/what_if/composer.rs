//! Combining scenario appliers.
//!
//! OR mode computes each active scenario on its own against the unmodified
//! baseline. AND mode layers every active scenario onto one schedule in a
//! fixed order:
//!
//! 1. extra EMIs and the annual lump sum are folded into one flat extra
//!    payment on a freshly generated schedule;
//! 2. the annual lump sum is then also paid on every 12th period;
//! 3. the one-time early payment is applied, carrying steps 1–2 forward;
//! 4. the EMI increase is layered last, on top of everything above.
//!
//! The order is a convention kept for compatibility with existing saved
//! what-if results; with several scenarios active the outcome depends on it.
//! Nothing is retained between calls, so switching mode always recomputes.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::appliers::{apply_annual_lump_sum, apply_early_payment, apply_emi_increase, apply_extra_emi};
use super::metrics::annotate_percentage_paid;
use super::scenario::{CompositionMode, ScenarioInput, ScenarioKind};
use crate::amortization::{generate_schedule, Loan, Schedule};
use crate::error::DebtPlannerError;
use crate::DebtPlannerResult;

/// Output of [`compose_scenarios`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposedScenarios {
    Combined(Schedule),
    Independent(BTreeMap<ScenarioKind, Schedule>),
}

impl ComposedScenarios {
    pub fn combined(&self) -> Option<&Schedule> {
        match self {
            ComposedScenarios::Combined(s) => Some(s),
            ComposedScenarios::Independent(_) => None,
        }
    }

    pub fn independent(&self, kind: ScenarioKind) -> Option<&Schedule> {
        match self {
            ComposedScenarios::Combined(_) => None,
            ComposedScenarios::Independent(map) => map.get(&kind),
        }
    }
}

pub fn compose_scenarios(
    loan: &Loan,
    input: &ScenarioInput,
    mode: CompositionMode,
) -> DebtPlannerResult<ComposedScenarios> {
    loan.validate()?;
    input.validate()?;

    match mode {
        CompositionMode::And => combine(loan, input).map(ComposedScenarios::Combined),
        CompositionMode::Or => independent(loan, input).map(ComposedScenarios::Independent),
    }
}

/// Every active scenario applied alone to the baseline, keyed by scenario.
fn independent(loan: &Loan, input: &ScenarioInput) -> DebtPlannerResult<BTreeMap<ScenarioKind, Schedule>> {
    let baseline = generate_schedule(loan, Decimal::ZERO)?;
    let mut schedules = BTreeMap::new();

    for kind in input.active_kinds() {
        let mut schedule = match kind {
            ScenarioKind::ExtraEmi => apply_extra_emi(loan, input.extra_emi_count)?,
            ScenarioKind::LumpSum => apply_annual_lump_sum(&baseline, loan, input.annual_lump_sum)?,
            ScenarioKind::EarlyPayment => match input.early_payment_request() {
                Some((amount, date)) => apply_early_payment(&baseline, loan, amount, date)?,
                None => continue,
            },
            ScenarioKind::EmiIncrease => apply_emi_increase(&baseline, loan, input.emi_increase_percent)?,
        };
        annotate_percentage_paid(&mut schedule, loan.principal);
        schedules.insert(kind, schedule);
    }

    log::debug!("OR composition produced {} schedules", schedules.len());
    Ok(schedules)
}

/// All active scenarios layered onto a single schedule.
fn combine(loan: &Loan, input: &ScenarioInput) -> DebtPlannerResult<Schedule> {
    let emi = loan.monthly_payment()?;
    let flat_extra = emi
        .checked_mul(Decimal::from(input.extra_emi_count))
        .and_then(|extra| extra.checked_add(input.annual_lump_sum))
        .ok_or_else(|| DebtPlannerError::scenario_overflow("annual_lump_sum"))?;
    let mut labels: Vec<&'static str> = Vec::new();

    let mut schedule = generate_schedule(loan, flat_extra)?;
    if input.is_active(ScenarioKind::ExtraEmi) {
        labels.push(ScenarioKind::ExtraEmi.label());
    }
    if input.is_active(ScenarioKind::LumpSum) {
        labels.push(ScenarioKind::LumpSum.label());
        schedule = apply_annual_lump_sum(&schedule, loan, input.annual_lump_sum)?;
    }
    if let Some((amount, date)) = input.early_payment_request() {
        labels.push(ScenarioKind::EarlyPayment.label());
        schedule = apply_early_payment(&schedule, loan, amount, date)?;
    }
    if input.is_active(ScenarioKind::EmiIncrease) {
        labels.push(ScenarioKind::EmiIncrease.label());
        schedule = apply_emi_increase(&schedule, loan, input.emi_increase_percent)?;
    }

    for period in schedule.periods.iter_mut() {
        period.applied_scenarios = labels.iter().map(|l| l.to_string()).collect();
    }
    annotate_percentage_paid(&mut schedule, loan.principal);

    log::debug!(
        "AND composition [{}]: tenure {}",
        labels.join(", "),
        schedule.tenure_months()
    );
    Ok(schedule)
}
