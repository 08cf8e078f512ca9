//! Finance API trait definition

use crate::error::Result;
use crate::types::{HealthResponse, ModelResponse, StockQuote};
use async_trait::async_trait;

/// Operations offered by the Finance Guru backend
///
/// [`FinanceClient`](crate::FinanceClient) is the HTTP implementation. Each
/// call is a single attempt: no retries, no timeouts, no caching.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait FinanceApi: Send + Sync {
    /// Backend address the client talks to
    fn base_url(&self) -> String;

    /// Fetch the current quote for `ticker`
    async fn get_quote(&self, ticker: &str) -> Result<StockQuote>;

    /// Request an AI analysis of `ticker`
    async fn analyze(&self, ticker: &str) -> Result<ModelResponse>;

    /// Fetch news for `ticker`, or general market news when `None`
    async fn get_news(&self, ticker: Option<String>) -> Result<ModelResponse>;

    /// Send a free-form prompt to the finance assistant
    async fn send_prompt(&self, prompt: &str) -> Result<ModelResponse>;

    /// Check whether the backend is up
    async fn check_health(&self) -> Result<HealthResponse>;
}
