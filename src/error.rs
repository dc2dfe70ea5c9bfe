//! Error types for the estimate pipeline.

use thiserror::Error;

/// Input validation failures. Surfaced to the caller, never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Polygon must have at least 3 points, got {0}")]
    InsufficientPoints(usize),

    #[error("Point {index} ({lat}, {lon}) is outside India's bounding box")]
    OutOfBounds { index: usize, lat: f64, lon: f64 },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange { start: String, end: String },
}

/// Errors from the crop and NDVI estimators
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Missing or malformed credentials. Fatal, there is no fallback.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure while serving the request, e.g. unreadable profile tables
    #[error("{0}")]
    Runtime(String),
}

impl EstimateError {
    pub fn is_validation(&self) -> bool {
        matches!(self, EstimateError::Validation(_))
    }
}
