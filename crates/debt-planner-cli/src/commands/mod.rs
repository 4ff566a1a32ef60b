pub mod loan;
pub mod tracking;
pub mod what_if;

use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;

use debt_planner_core::amortization::Loan;

/// Loan flags shared by every command that takes a loan.
#[derive(Args)]
pub struct LoanArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (8.5 = 8.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// Date of the first installment, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

impl LoanArgs {
    pub fn to_loan(&self) -> Result<Loan, Box<dyn std::error::Error>> {
        Ok(Loan::new(
            self.principal
                .ok_or("--principal is required (or provide --input)")?,
            self.rate.ok_or("--rate is required (or provide --input)")?,
            self.term.ok_or("--term is required (or provide --input)")?,
            self.start_date
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
        ))
    }
}
