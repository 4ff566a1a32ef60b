use rust_decimal::Decimal;
use thiserror::Error;

const OUT_OF_RANGE: &str = "Value is too large to amortize";

#[derive(Debug, Error)]
pub enum DebtPlannerError {
    #[error("Invalid loan parameters: {field} — {reason}")]
    InvalidLoanParameters { field: String, reason: String },

    #[error("Invalid scenario input: {field} — {reason}")]
    InvalidScenarioInput { field: String, reason: String },

    #[error("Negative amortization in month {month}: payment {payment} does not cover interest {interest}")]
    NegativeAmortization {
        month: u32,
        payment: Decimal,
        interest: Decimal,
    },

    #[error("Iteration limit of {limit} periods exceeded")]
    IterationLimit { limit: u32 },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DebtPlannerError {
    pub(crate) fn loan(field: &str, reason: impl Into<String>) -> Self {
        DebtPlannerError::InvalidLoanParameters {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn scenario(field: &str, reason: impl Into<String>) -> Self {
        DebtPlannerError::InvalidScenarioInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// A loan figure whose arithmetic left the 96-bit decimal range.
    pub(crate) fn loan_overflow(field: &str) -> Self {
        Self::loan(field, OUT_OF_RANGE)
    }

    pub(crate) fn scenario_overflow(field: &str) -> Self {
        Self::scenario(field, OUT_OF_RANGE)
    }
}

impl From<serde_json::Error> for DebtPlannerError {
    fn from(e: serde_json::Error) -> Self {
        DebtPlannerError::SerializationError(e.to_string())
    }
}
