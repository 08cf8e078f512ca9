//! Typed client for the Finance Guru backend
//!
//! The backend exposes quotes, AI stock analysis, news, a free-form prompt
//! endpoint, and a health probe. This crate wraps those endpoints behind the
//! [`FinanceApi`] trait and normalizes every failure into an [`ApiError`]:
//!
//! - backend unreachable → [`ApiError::Unreachable`]
//! - non-2xx response → [`ApiError::Status`] (code, reason, raw body)
//! - malformed body → [`ApiError::Decode`]
//!
//! # Example
//!
//! ```rust,no_run
//! use finance_api::{FinanceApi, FinanceClient};
//!
//! # async fn run() -> finance_api::Result<()> {
//! let client = FinanceClient::new("http://localhost:8000")?;
//! let quote = client.get_quote("AAPL").await?;
//! println!("{} {}", quote.ticker, quote.price);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::FinanceApi;
#[cfg(any(test, feature = "mock"))]
pub use api::MockFinanceApi;
pub use client::{DEFAULT_BASE_URL, FinanceClient};
pub use error::{ApiError, ErrorKind, Result};
pub use types::{
    DEFAULT_CURRENCY, HealthResponse, ModelResponse, NewsItem, Sentiment, StockQuote,
};
