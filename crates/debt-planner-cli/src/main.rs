mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;
use std::process;

use commands::loan::{EmiArgs, ScheduleArgs};
use commands::tracking::TrackArgs;
use commands::what_if::{EarlyPaymentArgs, EmiIncreaseArgs, LumpSumArgs, WhatIfArgs};

/// Loan amortization and what-if prepayment planning
#[derive(Parser)]
#[command(
    name = "dpl",
    version,
    about = "Loan amortization and what-if prepayment planning",
    long_about = "A CLI for building loan amortization schedules with decimal precision \
                  and comparing prepayment strategies: extra EMIs, annual lump sums, \
                  one-time early payments and yearly EMI increases."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log each computation step to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the equated monthly installment
    Emi(EmiArgs),
    /// Build the base amortization schedule
    Schedule(ScheduleArgs),
    /// Apply an annual lump sum on every loan anniversary
    LumpSum(LumpSumArgs),
    /// Apply a one-time early payment on a date
    EarlyPayment(EarlyPaymentArgs),
    /// Raise the EMI by a percentage every year
    EmiIncrease(EmiIncreaseArgs),
    /// Compare scenarios combined (and) or side by side (or)
    WhatIf(WhatIfArgs),
    /// Replay recorded payments and rate changes and report debt status
    Track(TrackArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::loan::run_emi(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::LumpSum(args) => commands::what_if::run_lump_sum(args),
        Commands::EarlyPayment(args) => commands::what_if::run_early_payment(args),
        Commands::EmiIncrease(args) => commands::what_if::run_emi_increase(args),
        Commands::WhatIf(args) => commands::what_if::run_what_if(args),
        Commands::Track(args) => commands::tracking::run_track(args),
        Commands::Version => {
            println!("dpl {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
