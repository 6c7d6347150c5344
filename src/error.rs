use thiserror::Error;

/// Errors surfaced by the estimator.
///
/// Only the area variants can come out of a calculation; every other
/// malformed input degrades to a default rate or a zero amount. The I/O
/// variants belong to rate-table loading and the export writers.
#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("booth area must be a positive number, got {value}")]
    InvalidArea { value: f64 },
    #[error("unrecognized area unit '{0}' (expected sqm or sqft)")]
    UnknownAreaUnit(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl EstimateError {
    /// True for the precondition failures a form should report to the user.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EstimateError::InvalidArea { .. } | EstimateError::UnknownAreaUnit(_)
        )
    }
}
