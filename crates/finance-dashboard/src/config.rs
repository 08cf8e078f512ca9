//! Configuration for the dashboard front-end

use crate::error::{DashboardError, Result};
use crate::state::normalize_ticker;
use finance_api::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};

/// Environment variable holding the backend address
pub const BASE_URL_ENV: &str = "FINANCE_API_URL";

/// Environment flag turning on chat timestamps
pub const SHOW_TIMESTAMPS_ENV: &str = "FINANCE_SHOW_TIMESTAMPS";

/// Tickers offered as one-key searches
pub const POPULAR_TICKERS: [&str; 6] = ["AAPL", "GOOGL", "MSFT", "TSLA", "AMZN", "NVDA"];

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Backend address
    pub base_url: String,
    /// Tickers shown by `/popular`, addressable as `/1`..`/n`
    pub popular_tickers: Vec<String>,
    /// REPL prompt prefix
    pub prompt: String,
    /// Whether chat messages show their time
    pub show_timestamps: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            popular_tickers: POPULAR_TICKERS.iter().map(ToString::to_string).collect(),
            prompt: "guru> ".to_string(),
            show_timestamps: false,
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Override fields from `FINANCE_API_URL` and `FINANCE_SHOW_TIMESTAMPS` when set
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Some(url) = finance_utils::env_var(BASE_URL_ENV) {
            self.base_url = url;
        }
        if let Some(show) = finance_utils::env_flag(SHOW_TIMESTAMPS_ENV) {
            self.show_timestamps = show;
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(DashboardError::Config("base_url must not be empty".to_string()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(DashboardError::Config(format!(
                "base_url must start with http:// or https://, got {base_url}"
            )));
        }

        if self.popular_tickers.is_empty() {
            return Err(DashboardError::Config(
                "popular_tickers must not be empty".to_string(),
            ));
        }
        if let Some(blank) = self
            .popular_tickers
            .iter()
            .position(|ticker| normalize_ticker(ticker).is_none())
        {
            return Err(DashboardError::Config(format!(
                "popular ticker #{} is blank",
                blank + 1
            )));
        }

        Ok(())
    }

    /// The n-th popular ticker, counting from 1
    pub fn popular(&self, n: usize) -> Option<&str> {
        n.checked_sub(1)
            .and_then(|index| self.popular_tickers.get(index))
            .map(String::as_str)
    }
}

/// Builder for `DashboardConfig`
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    base_url: Option<String>,
    popular_tickers: Option<Vec<String>>,
    prompt: Option<String>,
    show_timestamps: Option<bool>,
}

impl DashboardConfigBuilder {
    /// Set the backend address
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Replace the popular ticker list
    pub fn popular_tickers<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.popular_tickers = Some(tickers.into_iter().map(Into::into).collect());
        self
    }

    /// Set the REPL prompt
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set show timestamps
    pub fn show_timestamps(mut self, show: bool) -> Self {
        self.show_timestamps = Some(show);
        self
    }

    /// Fill unset fields from the environment
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if self.base_url.is_none() {
            self.base_url = finance_utils::env_var(BASE_URL_ENV);
        }
        if self.show_timestamps.is_none() {
            self.show_timestamps = finance_utils::env_flag(SHOW_TIMESTAMPS_ENV);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<DashboardConfig> {
        let defaults = DashboardConfig::default();

        let config = DashboardConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            popular_tickers: self.popular_tickers.unwrap_or(defaults.popular_tickers),
            prompt: self.prompt.unwrap_or(defaults.prompt),
            show_timestamps: self.show_timestamps.unwrap_or(defaults.show_timestamps),
        };

        config.validate()?;
        Ok(config)
    }
}
