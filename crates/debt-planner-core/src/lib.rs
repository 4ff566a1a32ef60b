pub mod amortization;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "what_if")]
pub mod what_if;

#[cfg(feature = "debt_tracking")]
pub mod debt_tracking;

pub use error::DebtPlannerError;
pub use types::*;

/// Standard result type for all debt-planner operations
pub type DebtPlannerResult<T> = Result<T, DebtPlannerError>;
