use serde::Serialize;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakdown {
    #[default]
    Yearly,
    Monthly,
}

/// Inputs for a single projection run. Rates are annual and expressed in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionPlan {
    pub base_monthly_amount: f64,
    pub duration_years: u32,
    pub annual_return_rate_percent: f64,
    pub annual_inflation_rate_percent: f64,
    pub annual_step_up_percent: f64,
}

impl ContributionPlan {
    pub fn new(
        base_monthly_amount: f64,
        duration_years: u32,
        annual_return_rate_percent: f64,
        annual_inflation_rate_percent: f64,
    ) -> Self {
        Self {
            base_monthly_amount,
            duration_years,
            annual_return_rate_percent,
            annual_inflation_rate_percent,
            annual_step_up_percent: 0.0,
        }
    }

    pub fn with_step_up(mut self, annual_step_up_percent: f64) -> Self {
        self.annual_step_up_percent = annual_step_up_percent;
        self
    }

    /// Nominal annual return divided by 12, not an effective-rate conversion.
    pub fn monthly_rate(&self) -> f64 {
        self.annual_return_rate_percent / 12.0 / 100.0
    }

    pub fn total_months(&self) -> u32 {
        self.duration_years.saturating_mul(12)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    pub period_index: u32,
    pub cumulative_invested: f64,
    pub compounded_value: f64,
    pub inflation_adjusted_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub breakdown: Breakdown,
    pub periods: Vec<PeriodRecord>,
    pub total_invested: f64,
    pub final_compounded_value: f64,
    pub final_inflation_adjusted_value: f64,
    /// Illustrative only: the total invested compounded as one sum from time
    /// zero. Not a cash-flow equivalent of the SIP result.
    pub lumpsum_comparison_value: f64,
}

impl ProjectionResult {
    pub fn returns_gained(&self) -> f64 {
        self.final_compounded_value - self.total_invested
    }
}
