//! Request and response bodies exchanged with the backend

use serde::{Deserialize, Deserializer, Serialize};

/// Currency assumed when the backend omits one
pub const DEFAULT_CURRENCY: &str = "USD";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

// `null` and "" both fall back to the default currency
fn deserialize_currency<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(default_currency))
}

/// Current price and recent change for a ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub ticker: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<f64>,
    #[serde(default = "default_currency", deserialize_with = "deserialize_currency")]
    pub currency: String,
    /// ISO-8601 time of the quote, as sent by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl StockQuote {
    pub fn new(ticker: impl Into<String>, price: f64) -> Self {
        Self {
            ticker: ticker.into(),
            price,
            change: None,
            change_pct: None,
            currency: default_currency(),
            timestamp: None,
        }
    }

    pub fn with_change(mut self, change: f64, change_pct: f64) -> Self {
        self.change = Some(change);
        self.change_pct = Some(change_pct);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

/// Text produced by an AI model (analysis, news, chat replies)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub content: String,
    /// Identifier of the model that produced `content`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ModelResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Structured news items, when `content` is a JSON array of them.
    ///
    /// Returns `None` for free-form (markdown) content.
    pub fn news_items(&self) -> Option<Vec<NewsItem>> {
        let trimmed = self.content.trim();
        if !trimmed.starts_with('[') {
            return None;
        }
        serde_json::from_str(trimmed).ok()
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Coarse market sentiment attached to a news item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }
}

/// A single headline in a structured news response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub source: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

/// Body of `POST /analysis/stock`
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest<'a> {
    pub ticker: &'a str,
}

/// Body of `POST /news`; serializes to `{}` without a ticker
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewsRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<&'a str>,
}

/// Body of `POST /prompt`
#[derive(Debug, Clone, Serialize)]
pub struct PromptRequest<'a> {
    pub prompt: &'a str,
}
