use thiserror::Error;

/// Failures reported by the sun and PV estimators.
///
/// None of these are fatal; the caller decides how to degrade (e.g. keep the
/// previous values on screen).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimateError {
    /// Missing or malformed date/time or other caller input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Geometry the estimator cannot analyse (e.g. a mesh without a triangle index).
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),
    /// The estimate was cancelled or superseded by a newer request.
    #[error("estimate cancelled")]
    Cancelled,
}

pub type EstimateResult<T> = std::result::Result<T, EstimateError>;
