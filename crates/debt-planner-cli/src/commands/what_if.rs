use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use debt_planner_core::what_if::{
    analyze_what_if, CompositionMode, ScenarioInput, ScenarioKind, WhatIfInput,
};

use super::LoanArgs;
use crate::input;

/// Arguments for the annual lump-sum scenario
#[derive(Args)]
pub struct LumpSumArgs {
    /// Path to JSON what-if input (only its lump sum is used)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Amount paid on every loan anniversary
    #[arg(long)]
    pub amount: Option<Decimal>,
}

/// Arguments for the one-time early payment scenario
#[derive(Args)]
pub struct EarlyPaymentArgs {
    /// Path to JSON what-if input (only its early payment is used)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// One-time prepayment amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Date of the prepayment, YYYY-MM-DD
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// Arguments for the yearly EMI increase scenario
#[derive(Args)]
pub struct EmiIncreaseArgs {
    /// Path to JSON what-if input (only its EMI increase is used)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Yearly increase in percent (0-100)
    #[arg(long)]
    pub percent: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Layer every active scenario onto one schedule
    And,
    /// One schedule per active scenario
    Or,
}

impl From<ModeArg> for CompositionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::And => CompositionMode::And,
            ModeArg::Or => CompositionMode::Or,
        }
    }
}

/// Arguments for the full what-if comparison
#[derive(Args)]
pub struct WhatIfArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Composition mode
    #[arg(long, default_value = "and")]
    pub mode: ModeArg,

    /// Extra EMIs per year (0-11)
    #[arg(long)]
    pub extra_emi_count: Option<u32>,

    /// Amount paid on every loan anniversary
    #[arg(long)]
    pub lump_sum: Option<Decimal>,

    /// Yearly EMI increase in percent
    #[arg(long)]
    pub emi_increase: Option<Decimal>,

    /// One-time prepayment amount
    #[arg(long)]
    pub early_payment: Option<Decimal>,

    /// Date of the one-time prepayment, YYYY-MM-DD
    #[arg(long)]
    pub early_payment_date: Option<NaiveDate>,
}

pub fn run_what_if(args: WhatIfArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let what_if_input: WhatIfInput = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => WhatIfInput {
            loan: args.loan.to_loan()?,
            scenarios: ScenarioInput {
                extra_emi_count: args.extra_emi_count.unwrap_or_default(),
                annual_lump_sum: args.lump_sum.unwrap_or_default(),
                emi_increase_percent: args.emi_increase.unwrap_or_default(),
                early_payment: args.early_payment,
                early_payment_date: args.early_payment_date,
            },
            mode: args.mode.into(),
        },
    };
    let result = analyze_what_if(&what_if_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_lump_sum(args: LumpSumArgs) -> Result<Value, Box<dyn std::error::Error>> {
    run_single(ScenarioKind::LumpSum, args.input.as_deref(), &args.loan, || {
        Ok(ScenarioInput {
            annual_lump_sum: args.amount.ok_or("--amount is required (or provide --input)")?,
            ..Default::default()
        })
    })
}

pub fn run_early_payment(args: EarlyPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    run_single(ScenarioKind::EarlyPayment, args.input.as_deref(), &args.loan, || {
        Ok(ScenarioInput {
            early_payment: Some(args.amount.ok_or("--amount is required (or provide --input)")?),
            early_payment_date: Some(args.date.ok_or("--date is required (or provide --input)")?),
            ..Default::default()
        })
    })
}

pub fn run_emi_increase(args: EmiIncreaseArgs) -> Result<Value, Box<dyn std::error::Error>> {
    run_single(ScenarioKind::EmiIncrease, args.input.as_deref(), &args.loan, || {
        Ok(ScenarioInput {
            emi_increase_percent: args.percent.ok_or("--percent is required (or provide --input)")?,
            ..Default::default()
        })
    })
}

/// Run one scenario against the baseline. With a JSON input every other
/// scenario in it is ignored.
fn run_single<F>(
    kind: ScenarioKind,
    path: Option<&str>,
    loan: &LoanArgs,
    from_flags: F,
) -> Result<Value, Box<dyn std::error::Error>>
where
    F: FnOnce() -> Result<ScenarioInput, Box<dyn std::error::Error>>,
{
    let mut request: WhatIfInput = match input::read_request(path)? {
        Some(request) => request,
        None => WhatIfInput {
            loan: loan.to_loan()?,
            scenarios: from_flags()?,
            mode: CompositionMode::Or,
        },
    };
    request.mode = CompositionMode::Or;
    request.scenarios = only(kind, &request.scenarios);

    let output = analyze_what_if(&request)?;
    let scenario = output
        .result
        .independent
        .get(&kind)
        .ok_or_else(|| format!("{} scenario is not active for the given input", kind.label()))?;

    let mut value = serde_json::to_value(&output)?;
    value["result"] = serde_json::to_value(scenario)?;
    Ok(value)
}

fn only(kind: ScenarioKind, scenarios: &ScenarioInput) -> ScenarioInput {
    let mut narrowed = ScenarioInput::default();
    match kind {
        ScenarioKind::ExtraEmi => narrowed.extra_emi_count = scenarios.extra_emi_count,
        ScenarioKind::LumpSum => narrowed.annual_lump_sum = scenarios.annual_lump_sum,
        ScenarioKind::EarlyPayment => {
            narrowed.early_payment = scenarios.early_payment;
            narrowed.early_payment_date = scenarios.early_payment_date;
        }
        ScenarioKind::EmiIncrease => narrowed.emi_increase_percent = scenarios.emi_increase_percent,
    }
    narrowed
}
