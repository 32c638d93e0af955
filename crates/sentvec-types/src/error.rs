//! Error types shared across the sentvec crates.

use thiserror::Error;

/// Unified error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum SentvecError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
