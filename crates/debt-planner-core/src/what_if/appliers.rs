//! Scenario appliers.
//!
//! Each applier takes a finished schedule and returns a new one; inputs are
//! never mutated. All of them are configurations of the shared re-derivation
//! in [`crate::amortization::recurrence`]: they decide, per period, the
//! installment and any principal reductions, and the recurrence does the rest.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::scenario::{validate_percent, ScenarioKind, MAX_EXTRA_EMI_COUNT};
use crate::amortization::recurrence::{rederive_from, PeriodTerms};
use crate::amortization::{generate_schedule, Loan, Schedule};
use crate::error::DebtPlannerError;
use crate::time_value::MONTHS_PER_YEAR;
use crate::types::{round_money, validate_amount, Money, Percent};
use crate::DebtPlannerResult;

/// Where a one-time payment lands in a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarlyPaymentPlacement {
    pub month: u32,
    /// Target date fell after the final period and was pulled back to it.
    pub clamped_to_last: bool,
}

/// Extra EMIs per year, expressed as an equivalent flat monthly extra of
/// `count × EMI` on a freshly generated schedule.
pub fn apply_extra_emi(loan: &Loan, extra_emi_count: u32) -> DebtPlannerResult<Schedule> {
    if extra_emi_count > MAX_EXTRA_EMI_COUNT {
        return Err(DebtPlannerError::scenario(
            "extra_emi_count",
            format!("Extra EMIs per year must be between 0 and {MAX_EXTRA_EMI_COUNT}"),
        ));
    }
    let flat_extra = loan
        .monthly_payment()?
        .checked_mul(Decimal::from(extra_emi_count))
        .ok_or_else(|| DebtPlannerError::scenario_overflow("extra_emi_count"))?;
    let mut schedule = generate_schedule(loan, flat_extra)?;
    if flat_extra > Decimal::ZERO {
        schedule.label_all(ScenarioKind::ExtraEmi.label());
    }
    log::debug!(
        "extra EMI x{extra_emi_count}: flat extra {flat_extra}, tenure {}",
        schedule.tenure_months()
    );
    Ok(schedule)
}

/// Pay `lump_sum` against principal on every 12th installment, re-deriving
/// the remainder on the unchanged installment and truncating at payoff.
pub fn apply_annual_lump_sum(
    schedule: &Schedule,
    loan: &Loan,
    lump_sum: Money,
) -> DebtPlannerResult<Schedule> {
    validate_amount("annual_lump_sum", lump_sum)?;
    if lump_sum.is_zero() {
        return Ok(schedule.clone());
    }

    let lump_sum = round_money(lump_sum);
    let monthly_rate = loan.monthly_rate();
    let mut out = rederive_from(loan, schedule, MONTHS_PER_YEAR, |row, _| {
        let mut terms = PeriodTerms::carried(row, monthly_rate);
        if row.month % MONTHS_PER_YEAR == 0 {
            terms.annual_lump_sum = terms
                .annual_lump_sum
                .checked_add(lump_sum)
                .ok_or_else(|| DebtPlannerError::scenario_overflow("annual_lump_sum"))?;
        }
        Ok(terms)
    })?;

    out.label_all(ScenarioKind::LumpSum.label());
    log::debug!(
        "annual lump sum {lump_sum}: tenure {} -> {}",
        schedule.tenure_months(),
        out.tenure_months()
    );
    Ok(out)
}

/// Locate the first period dated on or after `date`. Dates before the first
/// period land on period 1; dates after the last land on the last period.
pub fn place_early_payment(schedule: &Schedule, date: NaiveDate) -> Option<EarlyPaymentPlacement> {
    let last = schedule.last()?;
    Some(
        match schedule.iter().find(|p| p.date >= date) {
            Some(p) => EarlyPaymentPlacement {
                month: p.month,
                clamped_to_last: false,
            },
            None => EarlyPaymentPlacement {
                month: last.month,
                clamped_to_last: true,
            },
        },
    )
}

/// Apply `amount` once, at the first period dated on or after `date`, and
/// re-derive everything after it.
pub fn apply_early_payment(
    schedule: &Schedule,
    loan: &Loan,
    amount: Money,
    date: NaiveDate,
) -> DebtPlannerResult<Schedule> {
    validate_amount("early_payment", amount)?;
    let placement = match place_early_payment(schedule, date) {
        Some(p) if amount > Decimal::ZERO => p,
        _ => return Ok(schedule.clone()),
    };

    let amount = round_money(amount);
    let target = placement.month;
    let monthly_rate = loan.monthly_rate();
    let mut out = rederive_from(loan, schedule, target, |row, _| {
        let mut terms = PeriodTerms::carried(row, monthly_rate);
        if row.month == target {
            terms.one_time_payment = terms
                .one_time_payment
                .checked_add(amount)
                .ok_or_else(|| DebtPlannerError::scenario_overflow("early_payment"))?;
        }
        Ok(terms)
    })?;

    out.label_where(ScenarioKind::EarlyPayment.label(), |p| {
        p.month == target && p.one_time_lump_sum_applied > Decimal::ZERO
    });
    log::debug!(
        "early payment {amount} at month {target}: tenure {} -> {}",
        schedule.tenure_months(),
        out.tenure_months()
    );
    Ok(out)
}

/// Raise the EMI by `percent` on every anniversary, compounding, and
/// re-derive the schedule on the growing installment.
///
/// The increase is layered on top of whatever each period already paid, so
/// flat extras and lump sums in `schedule` are carried through unchanged.
pub fn apply_emi_increase(
    schedule: &Schedule,
    loan: &Loan,
    percent: Percent,
) -> DebtPlannerResult<Schedule> {
    validate_percent("emi_increase_percent", percent)?;
    if percent.is_zero() {
        return Ok(schedule.clone());
    }

    let base_payment = loan.monthly_payment()?;
    let growth = Decimal::ONE + percent / Decimal::from(100);
    let monthly_rate = loan.monthly_rate();

    let mut current_payment = base_payment;
    let mut years_elapsed = 0;

    let mut out = rederive_from(loan, schedule, MONTHS_PER_YEAR + 1, |row, _| {
        let row_year = (row.month - 1) / MONTHS_PER_YEAR;
        while years_elapsed < row_year {
            current_payment = current_payment
                .checked_mul(growth)
                .ok_or_else(|| DebtPlannerError::scenario_overflow("emi_increase_percent"))?;
            years_elapsed += 1;
        }
        let mut terms = PeriodTerms::carried(row, monthly_rate);
        terms.installment = terms
            .installment
            .checked_add(round_money(current_payment) - base_payment)
            .ok_or_else(|| DebtPlannerError::scenario_overflow("emi_increase_percent"))?;
        Ok(terms)
    })?;

    out.label_all(ScenarioKind::EmiIncrease.label());
    log::debug!(
        "EMI increase {percent}%: tenure {} -> {}",
        schedule.tenure_months(),
        out.tenure_months()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn car_loan() -> Loan {
        Loan::new(dec!(120_000), dec!(8.5), 60, date(2024, 1, 15))
    }

    fn baseline(loan: &Loan) -> Schedule {
        generate_schedule(loan, Decimal::ZERO).unwrap()
    }

    // -----------------------------------------------------------------------
    // Extra EMI
    // -----------------------------------------------------------------------

    #[test]
    fn test_extra_emi_shortens_and_labels() {
        let loan = car_loan();
        let base = baseline(&loan);
        let out = apply_extra_emi(&loan, 1).unwrap();

        assert!(out.len() < 60);
        assert!(out.total_interest() < base.total_interest());
        assert!(out.iter().all(|p| p.applied_scenarios == vec!["Extra EMI"]));
        assert_eq!(out.periods[0].payment, dec!(4923.96));
    }

    #[test]
    fn test_extra_emi_zero_is_baseline() {
        let loan = car_loan();
        assert_eq!(apply_extra_emi(&loan, 0).unwrap(), baseline(&loan));
    }

    #[test]
    fn test_extra_emi_count_out_of_range() {
        assert!(apply_extra_emi(&car_loan(), 12).is_err());
    }

    // -----------------------------------------------------------------------
    // Annual lump sum
    // -----------------------------------------------------------------------

    #[test]
    fn test_lump_sum_zero_is_identity() {
        let loan = car_loan();
        let base = baseline(&loan);
        assert_eq!(apply_annual_lump_sum(&base, &loan, Decimal::ZERO).unwrap(), base);
    }

    #[test]
    fn test_lump_sum_lands_on_anniversaries() {
        let loan = car_loan();
        let base = baseline(&loan);
        let out = apply_annual_lump_sum(&base, &loan, dec!(10_000)).unwrap();

        // First eleven months untouched apart from labels
        for (a, b) in out.iter().zip(base.iter()).take(11) {
            assert_eq!(a.payment, b.payment);
            assert_eq!(a.remaining_principal, b.remaining_principal);
        }

        let month_12 = &out.periods[11];
        assert_eq!(month_12.annual_lump_sum_applied, dec!(10_000));
        assert_eq!(month_12.payment, base.periods[11].payment + dec!(10_000));
        assert_eq!(
            month_12.remaining_principal,
            base.periods[11].remaining_principal - dec!(10_000)
        );

        for p in out.iter() {
            if p.month % 12 != 0 {
                assert!(p.annual_lump_sum_applied.is_zero());
            }
            assert_eq!(p.applied_scenarios, vec!["Lump Sum"]);
            assert_eq!(p.principal_portion + p.interest_portion, p.payment);
        }

        assert!(out.len() < base.len());
        assert!(out.is_paid_off());
        assert!(out.total_interest() < base.total_interest());
    }

    #[test]
    fn test_lump_sum_after_month_12_uses_unchanged_installment() {
        let loan = car_loan();
        let base = baseline(&loan);
        let out = apply_annual_lump_sum(&base, &loan, dec!(5000)).unwrap();
        let emi = loan.monthly_payment().unwrap();

        for p in out.iter().take(out.len() - 1) {
            assert_eq!(p.regular_installment(), emi);
        }
    }

    #[test]
    fn test_lump_sum_on_short_schedule_changes_nothing_numeric() {
        let loan = Loan::new(dec!(6000), dec!(5), 6, date(2024, 1, 1));
        let base = baseline(&loan);
        let out = apply_annual_lump_sum(&base, &loan, dec!(1000)).unwrap();
        assert_eq!(out.len(), base.len());
        assert_eq!(out.total_interest(), base.total_interest());
    }

    #[test]
    fn test_negative_lump_sum_rejected() {
        let loan = car_loan();
        assert!(apply_annual_lump_sum(&baseline(&loan), &loan, dec!(-1)).is_err());
    }

    // -----------------------------------------------------------------------
    // Early payment
    // -----------------------------------------------------------------------

    #[test]
    fn test_early_payment_applies_once_at_first_period_on_or_after_date() {
        let loan = car_loan();
        let base = baseline(&loan);
        // Falls between the 15 Mar and 15 Apr installments
        let out = apply_early_payment(&base, &loan, dec!(20_000), date(2024, 3, 20)).unwrap();

        let applied: Vec<u32> = out
            .iter()
            .filter(|p| p.one_time_lump_sum_applied > Decimal::ZERO)
            .map(|p| p.month)
            .collect();
        assert_eq!(applied, vec![4]);

        let target = &out.periods[3];
        assert_eq!(target.applied_scenarios, vec!["Early Payment"]);
        assert_eq!(
            target.remaining_principal,
            base.periods[3].remaining_principal - dec!(20_000)
        );
        assert!(out.iter().filter(|p| p.month != 4).all(|p| p.applied_scenarios.is_empty()));
        assert!(out.len() < base.len());
    }

    #[test]
    fn test_early_payment_before_first_period_applies_at_month_1() {
        let loan = car_loan();
        let base = baseline(&loan);
        let out = apply_early_payment(&base, &loan, dec!(1000), date(2020, 1, 1)).unwrap();
        assert_eq!(out.periods[0].one_time_lump_sum_applied, dec!(1000));
    }

    #[test]
    fn test_early_payment_after_last_period_is_clamped() {
        let loan = car_loan();
        let base = baseline(&loan);
        let late = date(2040, 1, 1);

        let placement = place_early_payment(&base, late).unwrap();
        assert_eq!(placement.month, 60);
        assert!(placement.clamped_to_last);

        let out = apply_early_payment(&base, &loan, dec!(1000), late).unwrap();
        assert_eq!(out.len(), 60);
        let last = out.last().unwrap();
        assert_eq!(last.one_time_lump_sum_applied, dec!(1000));
        assert_eq!(last.applied_scenarios, vec!["Early Payment"]);
        // Final month already settles the balance, so the total is unchanged
        assert_eq!(last.payment, base.last().unwrap().payment);
        assert!(out.is_paid_off());
    }

    #[test]
    fn test_early_payment_larger_than_balance_pays_off() {
        let loan = car_loan();
        let base = baseline(&loan);
        let out = apply_early_payment(&base, &loan, dec!(500_000), date(2024, 6, 1)).unwrap();
        assert_eq!(out.len(), 6);
        assert!(out.is_paid_off());
        let last = out.last().unwrap();
        assert_eq!(last.one_time_lump_sum_applied, last.opening_principal());
        assert_eq!(last.payment, last.opening_principal() + last.interest_portion);
    }

    #[test]
    fn test_early_payment_zero_is_identity() {
        let loan = car_loan();
        let base = baseline(&loan);
        let out = apply_early_payment(&base, &loan, Decimal::ZERO, date(2024, 6, 1)).unwrap();
        assert_eq!(out, base);
    }

    // -----------------------------------------------------------------------
    // EMI increase
    // -----------------------------------------------------------------------

    #[test]
    fn test_emi_increase_compounds_each_anniversary() {
        let loan = Loan::new(dec!(500_000), dec!(9), 240, date(2024, 1, 1));
        let base = baseline(&loan);
        let out = apply_emi_increase(&base, &loan, dec!(10)).unwrap();
        let emi = loan.monthly_payment().unwrap();

        assert_eq!(out.periods[0].payment, emi);
        assert_eq!(out.periods[11].payment, emi);
        assert_eq!(out.periods[12].payment, round_money(emi * dec!(1.1)));
        assert_eq!(out.periods[24].payment, round_money(emi * dec!(1.1) * dec!(1.1)));
        assert!(out.len() < base.len());
        assert!(out.is_paid_off());
        assert!(out.iter().all(|p| p.applied_scenarios == vec!["EMI Increase"]));
    }

    #[test]
    fn test_emi_increase_final_period_never_overpays() {
        let loan = Loan::new(dec!(500_000), dec!(9), 240, date(2024, 1, 1));
        let out = apply_emi_increase(&baseline(&loan), &loan, dec!(25)).unwrap();
        let last = out.last().unwrap();
        assert!(last.principal_portion >= Decimal::ZERO);
        assert_eq!(last.principal_portion, last.opening_principal());
        assert_eq!(last.remaining_principal, Decimal::ZERO);
    }

    #[test]
    fn test_emi_increase_out_of_range() {
        let loan = car_loan();
        assert!(apply_emi_increase(&baseline(&loan), &loan, dec!(150)).is_err());
    }

    #[test]
    fn test_emi_increase_on_overlong_schedule_hits_iteration_limit() {
        // A stored schedule far longer than its loan's term, as could arrive
        // from a hand-edited or stale JSON file.
        let loan = Loan::new(dec!(100_000), dec!(0), 6, date(2024, 1, 1));
        let rows: Vec<serde_json::Value> = (1..=40u32)
            .map(|month| {
                serde_json::json!({
                    "month": month,
                    "date": loan.period_date(month).unwrap(),
                    "payment": "10",
                    "principal_portion": "10",
                    "interest_portion": "0",
                    "remaining_principal": (dec!(100_000) - dec!(10) * Decimal::from(month)).to_string(),
                    "cumulative_interest_paid": "0",
                })
            })
            .collect();
        let stored: Schedule = serde_json::from_value(serde_json::Value::Array(rows)).unwrap();
        assert_eq!(stored.len(), 40);

        assert!(matches!(
            apply_emi_increase(&stored, &loan, dec!(1)),
            Err(DebtPlannerError::IterationLimit { limit: 12 })
        ));
    }

    #[test]
    fn test_oversized_amounts_rejected_by_appliers() {
        let loan = car_loan();
        let base = baseline(&loan);
        assert!(matches!(
            apply_annual_lump_sum(&base, &loan, Decimal::MAX),
            Err(DebtPlannerError::InvalidScenarioInput { ref field, .. }) if field == "annual_lump_sum"
        ));
        assert!(matches!(
            apply_early_payment(&base, &loan, Decimal::MAX, date(2025, 1, 1)),
            Err(DebtPlannerError::InvalidScenarioInput { ref field, .. }) if field == "early_payment"
        ));
    }

    #[test]
    fn test_appliers_do_not_mutate_input() {
        let loan = car_loan();
        let base = baseline(&loan);
        let snapshot = base.clone();
        let _ = apply_annual_lump_sum(&base, &loan, dec!(1000)).unwrap();
        let _ = apply_early_payment(&base, &loan, dec!(1000), date(2025, 1, 1)).unwrap();
        let _ = apply_emi_increase(&base, &loan, dec!(5)).unwrap();
        assert_eq!(base, snapshot);
    }
}
