//! Error types for the dashboard front-end

use finance_api::ApiError;
use thiserror::Error;

/// Dashboard specific errors
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// REPL input could not be parsed
    #[error("{0}")]
    Command(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// State could not be serialized
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
