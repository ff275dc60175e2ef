//! Error types for the revenue_forecast crate

use thiserror::Error;

/// Custom error types for the revenue_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Not enough observations for the requested model
    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to model fitting or prediction
    #[error("Model error: {0}")]
    ModelError(String),

    /// The external forecast sink rejected the update
    #[error("Publish failed: {0}")]
    PublishFailed(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
