mod engine;
mod error;
mod types;

pub use engine::{
    MAX_DURATION_YEARS, closed_form_future_value, lumpsum_comparison_value, project,
    project_with_breakdown, validate,
};
pub use error::InvalidInputError;
pub use types::{Breakdown, ContributionPlan, PeriodRecord, ProjectionResult};
