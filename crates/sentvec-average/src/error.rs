//! Averaging error types.

use thiserror::Error;

/// Errors raised while building model views or validating call buffers.
///
/// The numeric hot path itself never returns an error: truncation and
/// out-of-vocabulary handling are silent policies.
#[derive(Debug, Error)]
pub enum AverageError {
    /// Shared type or configuration error
    #[error(transparent)]
    Types(#[from] sentvec_types::SentvecError),

    /// Buffer width or row count does not match the model
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
