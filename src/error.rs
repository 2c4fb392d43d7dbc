//! Error types for the ensemble-dressing library.

use thiserror::Error;

/// Result type alias for dressing and verification operations.
pub type Result<T> = std::result::Result<T, DressingError>;

/// Errors that can occur while fitting, evaluating or scoring ensembles.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DressingError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Member (column) count disagrees with what the model was built for.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Row counts of aligned inputs disagree, or a matrix is ragged.
    #[error("shape mismatch: expected {expected} rows, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// A predicted discretized CDF is not a valid distribution function.
    #[error("invalid CDF in case {case}: {reason}")]
    InvalidCdf { case: usize, reason: String },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before evaluation")]
    FitRequired,

    /// Computation error (e.g., numerical issues, search did not converge).
    #[error("computation error: {0}")]
    ComputationError(String),
}
