use napi::Result as NapiResult;
use napi_derive::napi;

use debt_planner_core::amortization::{self, Loan, ScheduleInput};
use debt_planner_core::debt_tracking::{self, DebtTrackingInput};
use debt_planner_core::what_if::{self, WhatIfInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

/// `input_json` is a loan document.
#[napi]
pub fn calculate_emi(input_json: String) -> NapiResult<String> {
    let loan: Loan = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::analyze_emi(&loan).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: ScheduleInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::analyze_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// What-if scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_what_if(input_json: String) -> NapiResult<String> {
    let input: WhatIfInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = what_if::analyze_what_if(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Debt tracking
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_debt(input_json: String) -> NapiResult<String> {
    let input: DebtTrackingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = debt_tracking::analyze_debt(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
