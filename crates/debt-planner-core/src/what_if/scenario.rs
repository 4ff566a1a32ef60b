//! Scenario inputs and their validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DebtPlannerError;
use crate::types::{validate_amount, Money, Percent};
use crate::DebtPlannerResult;

/// Most extra EMIs a borrower can commit to in a year.
pub const MAX_EXTRA_EMI_COUNT: u32 = 11;

/// The four hypothetical payment adjustments, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    ExtraEmi,
    LumpSum,
    EarlyPayment,
    EmiIncrease,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::ExtraEmi,
        ScenarioKind::LumpSum,
        ScenarioKind::EarlyPayment,
        ScenarioKind::EmiIncrease,
    ];

    /// Label stamped on schedule rows the scenario touched.
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioKind::ExtraEmi => "Extra EMI",
            ScenarioKind::LumpSum => "Lump Sum",
            ScenarioKind::EarlyPayment => "Early Payment",
            ScenarioKind::EmiIncrease => "EMI Increase",
        }
    }
}

/// How active scenarios are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionMode {
    /// All active scenarios shape a single schedule.
    #[default]
    #[serde(alias = "AND", alias = "And")]
    And,
    /// Each active scenario is computed on its own against the baseline.
    #[serde(alias = "OR", alias = "Or")]
    Or,
}

/// A bundle of hypothetical payment adjustments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioInput {
    /// Extra EMIs paid per year (0–11), spread as a flat monthly extra.
    pub extra_emi_count: u32,
    /// Paid against principal on every 12th installment.
    pub annual_lump_sum: Money,
    /// EMI growth applied on each anniversary, compounding (0–100).
    pub emi_increase_percent: Percent,
    /// One-time prepayment; requires `early_payment_date`.
    pub early_payment: Option<Money>,
    pub early_payment_date: Option<NaiveDate>,
}

impl ScenarioInput {
    pub fn validate(&self) -> DebtPlannerResult<()> {
        if self.extra_emi_count > MAX_EXTRA_EMI_COUNT {
            return Err(DebtPlannerError::scenario(
                "extra_emi_count",
                format!("Extra EMIs per year must be between 0 and {MAX_EXTRA_EMI_COUNT}"),
            ));
        }
        validate_amount("annual_lump_sum", self.annual_lump_sum)?;
        validate_percent("emi_increase_percent", self.emi_increase_percent)?;

        match (self.early_payment, self.early_payment_date) {
            (Some(amount), Some(_)) => validate_amount("early_payment", amount),
            (Some(_), None) => Err(DebtPlannerError::scenario(
                "early_payment_date",
                "Early payment requires a date",
            )),
            (None, Some(_)) => Err(DebtPlannerError::scenario(
                "early_payment",
                "Early payment date given without an amount",
            )),
            _ => Ok(()),
        }
    }

    /// The one-time prepayment, when both amount and date drive it.
    pub fn early_payment_request(&self) -> Option<(Money, NaiveDate)> {
        match (self.early_payment, self.early_payment_date) {
            (Some(amount), Some(date)) if amount > Decimal::ZERO => Some((amount, date)),
            _ => None,
        }
    }

    pub fn is_active(&self, kind: ScenarioKind) -> bool {
        match kind {
            ScenarioKind::ExtraEmi => self.extra_emi_count > 0,
            ScenarioKind::LumpSum => self.annual_lump_sum > Decimal::ZERO,
            ScenarioKind::EarlyPayment => self.early_payment_request().is_some(),
            ScenarioKind::EmiIncrease => self.emi_increase_percent > Decimal::ZERO,
        }
    }

    /// Active scenarios in evaluation order.
    pub fn active_kinds(&self) -> Vec<ScenarioKind> {
        ScenarioKind::ALL
            .into_iter()
            .filter(|k| self.is_active(*k))
            .collect()
    }
}

pub(crate) fn validate_percent(field: &str, value: Percent) -> DebtPlannerResult<()> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(DebtPlannerError::scenario(
            field,
            "Percentage must be between 0 and 100",
        ));
    }
    Ok(())
}
