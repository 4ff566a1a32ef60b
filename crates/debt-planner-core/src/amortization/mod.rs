//! Loans and their amortization schedules.

pub mod loan;
pub mod recurrence;
pub mod schedule;

pub use loan::{analyze_emi, EmiOutput, Loan};
pub use recurrence::{PeriodTerms, ITERATION_CAP_MULTIPLIER};
pub use schedule::{analyze_schedule, generate_schedule, PeriodEntry, Schedule, ScheduleInput, ScheduleOutput};
