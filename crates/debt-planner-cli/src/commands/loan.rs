use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use debt_planner_core::amortization::{analyze_emi, analyze_schedule, Loan, ScheduleInput};

use super::LoanArgs;
use crate::input;

/// Arguments for the EMI calculation
#[derive(Args)]
pub struct EmiArgs {
    /// Path to a JSON loan document (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Arguments for the base schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Flat amount added to every installment
    #[arg(long)]
    pub extra_payment: Option<Decimal>,
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan: Loan = match input::read_request(args.input.as_deref())? {
        Some(loan) => loan,
        None => args.loan.to_loan()?,
    };
    let result = analyze_emi(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => ScheduleInput {
            loan: args.loan.to_loan()?,
            flat_extra_payment: args.extra_payment.unwrap_or_default(),
        },
    };
    let result = analyze_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
