use thiserror::Error;

/// Rejected plan input. Raised before any computation starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {reason}")]
pub struct InvalidInputError {
    pub field: &'static str,
    pub reason: String,
}

impl InvalidInputError {
    pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
