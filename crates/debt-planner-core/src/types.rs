use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DebtPlannerError;
use crate::DebtPlannerResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Periodic rates expressed as decimals (0.005 = 0.5% per month).
pub type Rate = Decimal;

/// Human-facing percentages (8.5 = 8.5%).
pub type Percent = Decimal;

/// Decimal places carried by every monetary figure the engine emits.
pub const MONEY_SCALE: u32 = 2;

/// Round a monetary amount to cents (banker's rounding).
pub fn round_money(amount: Money) -> Money {
    amount.round_dp(MONEY_SCALE)
}

/// Largest principal or payment amount accepted on input.
pub const MAX_AMOUNT: Money = dec!(1_000_000_000_000_000);

/// Reject a scenario amount that is negative or above [`MAX_AMOUNT`].
pub(crate) fn validate_amount(field: &str, amount: Money) -> DebtPlannerResult<()> {
    if amount < Decimal::ZERO {
        return Err(DebtPlannerError::scenario(field, "Amount cannot be negative"));
    }
    if amount > MAX_AMOUNT {
        return Err(DebtPlannerError::scenario(
            field,
            format!("Amount cannot exceed {MAX_AMOUNT}"),
        ));
    }
    Ok(())
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    for warning in &warnings {
        log::warn!("{methodology}: {warning}");
    }
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit_cents".to_string(),
        },
    }
}
