use log::debug;

use super::error::InvalidInputError;
use super::types::{Breakdown, ContributionPlan, PeriodRecord, ProjectionResult};

const MONTHS_PER_YEAR: u32 = 12;

/// Longest plan the engine will project. Keeps the loop and the period table
/// bounded well above the 50-year range offered to users.
pub const MAX_DURATION_YEARS: u32 = 100;

#[derive(Debug, Clone, Copy, Default)]
struct Accumulation {
    invested: f64,
    value: f64,
}

impl Accumulation {
    // Contribution lands at the end of the month, after that month's growth.
    fn contribute(&mut self, amount: f64, monthly_rate: f64) {
        self.invested += amount;
        self.value = self.value * (1.0 + monthly_rate) + amount;
    }
}

pub fn validate(plan: &ContributionPlan) -> Result<(), InvalidInputError> {
    if !plan.base_monthly_amount.is_finite() {
        return Err(InvalidInputError::new(
            "baseMonthlyAmount",
            "must be a finite number",
        ));
    }
    if plan.base_monthly_amount <= 0.0 {
        return Err(InvalidInputError::new("baseMonthlyAmount", "must be > 0"));
    }

    if plan.duration_years < 1 {
        return Err(InvalidInputError::new("durationYears", "must be >= 1"));
    }
    if plan.duration_years > MAX_DURATION_YEARS {
        return Err(InvalidInputError::new(
            "durationYears",
            format!("must be <= {MAX_DURATION_YEARS}"),
        ));
    }

    for (field, rate) in [
        ("annualReturnRatePercent", plan.annual_return_rate_percent),
        (
            "annualInflationRatePercent",
            plan.annual_inflation_rate_percent,
        ),
        ("annualStepUpPercent", plan.annual_step_up_percent),
    ] {
        if !rate.is_finite() {
            return Err(InvalidInputError::new(field, "must be a finite number"));
        }
        if rate < 0.0 {
            return Err(InvalidInputError::new(field, "must be >= 0"));
        }
    }

    Ok(())
}

/// Year-indexed projection: one record per year of the plan.
pub fn project(plan: &ContributionPlan) -> Result<ProjectionResult, InvalidInputError> {
    project_with_breakdown(plan, Breakdown::Yearly)
}

/// Runs the monthly compounding loop and reports it at the requested
/// granularity. Inflation is discounted by completed whole years in both
/// cases, so the record for month `12k` always matches the record for year `k`.
pub fn project_with_breakdown(
    plan: &ContributionPlan,
    breakdown: Breakdown,
) -> Result<ProjectionResult, InvalidInputError> {
    validate(plan)?;

    let monthly_rate = plan.monthly_rate();
    let inflation_rate = plan.annual_inflation_rate_percent / 100.0;
    let step_up_factor = 1.0 + plan.annual_step_up_percent / 100.0;

    let capacity = match breakdown {
        Breakdown::Yearly => plan.duration_years,
        Breakdown::Monthly => plan.total_months(),
    };
    let mut periods = Vec::with_capacity(capacity as usize);
    let mut accumulation = Accumulation::default();
    let mut monthly_contribution = plan.base_monthly_amount;

    for year in 1..=plan.duration_years {
        for month in 1..=MONTHS_PER_YEAR {
            accumulation.contribute(monthly_contribution, monthly_rate);

            if breakdown == Breakdown::Monthly {
                let completed_years = if month == MONTHS_PER_YEAR {
                    year
                } else {
                    year - 1
                };
                periods.push(period_record(
                    (year - 1) * MONTHS_PER_YEAR + month,
                    accumulation,
                    inflation_rate,
                    completed_years,
                ));
            }
        }

        if breakdown == Breakdown::Yearly {
            periods.push(period_record(year, accumulation, inflation_rate, year));
        }

        monthly_contribution *= step_up_factor;
    }

    let Some(last) = periods.last().copied() else {
        return Err(InvalidInputError::new("durationYears", "must be >= 1"));
    };

    let lumpsum = lumpsum_comparison_value(
        last.cumulative_invested,
        plan.annual_return_rate_percent,
        plan.duration_years,
    );

    debug!(
        "projected {plan:?} over {} {breakdown:?} periods: invested={} value={} real={}",
        periods.len(),
        last.cumulative_invested,
        last.compounded_value,
        last.inflation_adjusted_value
    );

    Ok(ProjectionResult {
        breakdown,
        periods,
        total_invested: last.cumulative_invested,
        final_compounded_value: last.compounded_value,
        final_inflation_adjusted_value: last.inflation_adjusted_value,
        lumpsum_comparison_value: round_currency(lumpsum),
    })
}

/// Future value of a level SIP from the annuity formula
/// `P * ((1 + r)^n - 1) / r * (1 + r)`. Only defined without step-up.
pub fn closed_form_future_value(plan: &ContributionPlan) -> Result<f64, InvalidInputError> {
    validate(plan)?;
    if plan.annual_step_up_percent != 0.0 {
        return Err(InvalidInputError::new(
            "annualStepUpPercent",
            "must be 0 for the closed-form annuity",
        ));
    }

    let r = plan.monthly_rate();
    let n = plan.duration_years as f64 * MONTHS_PER_YEAR as f64;
    let p = plan.base_monthly_amount;
    if r == 0.0 {
        return Ok(p * n);
    }

    Ok(p * (((1.0 + r).powf(n) - 1.0) / r) * (1.0 + r))
}

/// Total invested compounded annually from time zero. A contrast figure for
/// display, not a discounted equivalent of the SIP.
pub fn lumpsum_comparison_value(
    total_invested: f64,
    annual_return_rate_percent: f64,
    duration_years: u32,
) -> f64 {
    total_invested * (1.0 + annual_return_rate_percent / 100.0).powf(duration_years as f64)
}

fn period_record(
    period_index: u32,
    accumulation: Accumulation,
    inflation_rate: f64,
    completed_years: u32,
) -> PeriodRecord {
    let discount = (1.0 + inflation_rate).powf(completed_years as f64);
    PeriodRecord {
        period_index,
        cumulative_invested: round_currency(accumulation.invested),
        compounded_value: round_currency(accumulation.value),
        inflation_adjusted_value: round_currency(accumulation.value / discount),
    }
}

fn round_currency(value: f64) -> f64 {
    value.round_ties_even()
}
