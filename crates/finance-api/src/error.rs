//! Error types for Finance API operations

use thiserror::Error;

/// Errors returned by every [`FinanceApi`](crate::FinanceApi) operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The backend could not be reached (connection refused, DNS, reset)
    #[error("Unable to connect to the Finance API. Please ensure the backend is running on {base_url}")]
    Unreachable { base_url: String },

    /// The backend answered with a non-2xx status
    #[error("API Error: {status}{} - {body}", leading_space(.status_text))]
    Status {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The response body was not the expected JSON shape
    #[error("Invalid response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// The configured base URL is unusable
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// `text` with a separating space, or nothing when `text` is empty
fn leading_space(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!(" {text}")
    }
}

/// Coarse classification of an [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Backend unreachable
    Transport,
    /// Non-success HTTP status
    Status,
    /// Malformed response body
    Decode,
    /// Client misconfiguration
    Config,
}

impl ApiError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unreachable { .. } => ErrorKind::Transport,
            Self::Status { .. } => ErrorKind::Status,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::InvalidBaseUrl { .. } => ErrorKind::Config,
        }
    }

    /// HTTP status code, if the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

/// Result type alias for Finance API operations
pub type Result<T> = std::result::Result<T, ApiError>;
