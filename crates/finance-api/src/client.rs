//! HTTP implementation of [`FinanceApi`]

use crate::api::FinanceApi;
use crate::error::{ApiError, Result};
use crate::types::{
    AnalysisRequest, HealthResponse, ModelResponse, NewsRequest, PromptRequest, StockQuote,
};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

/// Backend address used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const QUOTE_PATH: &str = "/price/quote";
const ANALYSIS_PATH: &str = "/analysis/stock";
const NEWS_PATH: &str = "/news";
const PROMPT_PATH: &str = "/prompt";
const HEALTH_PATH: &str = "/health";

/// Finance API client over reqwest
#[derive(Debug, Clone)]
pub struct FinanceClient {
    client: Client,
    base_url: String,
}

impl FinanceClient {
    /// Create a client for the backend at `base_url`
    ///
    /// The URL must be absolute `http` or `https`; a trailing slash is dropped.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(&base_url.into())?;
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// Create a client for [`DEFAULT_BASE_URL`]
    pub fn local() -> Result<Self> {
        Self::new(DEFAULT_BASE_URL)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn unreachable(&self, err: &reqwest::Error) -> ApiError {
        debug!("Transport failure talking to {}: {}", self.base_url, err);
        ApiError::Unreachable {
            base_url: self.base_url.clone(),
        }
    }

    /// Send a request and decode its JSON body
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, path: &str) -> Result<T> {
        let response = request
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|e| self.unreachable(&e))?;

        let status = response.status();
        if !status.is_success() {
            debug!("{} returned HTTP {}", path, status);
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!("Error body from {} unreadable: {}", path, e);
                    String::new()
                }
            };
            return Err(ApiError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.unreachable(&e))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl FinanceApi for FinanceClient {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn get_quote(&self, ticker: &str) -> Result<StockQuote> {
        debug!("Fetching quote");
        let request = self
            .client
            .get(self.endpoint(QUOTE_PATH))
            .query(&[("ticker", ticker)]);
        self.execute(request, QUOTE_PATH).await
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn analyze(&self, ticker: &str) -> Result<ModelResponse> {
        debug!("Requesting analysis");
        let request = self
            .client
            .post(self.endpoint(ANALYSIS_PATH))
            .json(&AnalysisRequest { ticker });
        self.execute(request, ANALYSIS_PATH).await
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn get_news(&self, ticker: Option<String>) -> Result<ModelResponse> {
        debug!("Fetching news");
        let request = self.client.post(self.endpoint(NEWS_PATH)).json(&NewsRequest {
            ticker: ticker.as_deref(),
        });
        self.execute(request, NEWS_PATH).await
    }

    #[instrument(skip(self, prompt), fields(base_url = %self.base_url, prompt_len = prompt.len()))]
    async fn send_prompt(&self, prompt: &str) -> Result<ModelResponse> {
        debug!("Sending prompt");
        let request = self
            .client
            .post(self.endpoint(PROMPT_PATH))
            .json(&PromptRequest { prompt });
        self.execute(request, PROMPT_PATH).await
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn check_health(&self) -> Result<HealthResponse> {
        debug!("Checking backend health");
        let request = self.client.get(self.endpoint(HEALTH_PATH));
        self.execute(request, HEALTH_PATH).await
    }
}

/// Validate `raw` and strip any trailing slash
fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: trimmed.to_string(),
        reason,
    };

    let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".to_string()));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}
