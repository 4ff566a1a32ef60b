use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use debt_planner_core::debt_tracking::{analyze_debt, DebtHistory, DebtTrackingInput, TrackingOptions};

use super::LoanArgs;
use crate::input;

/// Arguments for debt tracking
#[derive(Args)]
pub struct TrackArgs {
    /// Path to JSON input with loan, history and options (overrides loan flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Flat amount added to every installment
    #[arg(long)]
    pub extra_payment: Option<Decimal>,

    /// Ignore recorded payments and rate changes
    #[arg(long)]
    pub ignore_history: bool,

    /// Status date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_track(args: TrackArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut tracking_input: DebtTrackingInput = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => DebtTrackingInput {
            loan: args.loan.to_loan()?,
            history: DebtHistory::default(),
            options: TrackingOptions::default(),
            as_of: None,
        },
    };

    // Flags refine whatever the document says.
    if let Some(extra) = args.extra_payment {
        tracking_input.options.extra_payment = extra;
    }
    if args.ignore_history {
        tracking_input.options.ignore_history = true;
    }
    if args.as_of.is_some() {
        tracking_input.as_of = args.as_of;
    }

    let result = analyze_debt(&tracking_input)?;
    Ok(serde_json::to_value(result)?)
}
