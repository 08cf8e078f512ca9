//! Dashboard state container and its transition functions
//!
//! All controller-visible state lives in [`DashboardState`]. It is mutated only
//! through the functions here so the per-section state machines can be tested
//! without any network or rendering:
//!
//! ```text
//! Idle ──begin_search──▶ Loading ──apply(Ok)──▶ Resolved(value)
//!                           │
//!                           └────apply(Err)──▶ Failed (+ notification)
//! ```
//!
//! Every search bumps a generation counter. Completions carry the generation
//! they were issued under and are discarded when it is no longer current.

use finance_api::{ApiError, HealthResponse, ModelResponse, StockQuote};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, warn};

/// Lifecycle of one dashboard section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum SectionState<T> {
    /// Nothing requested yet
    Idle,
    /// A fetch is in flight; the previous value has been cleared
    Loading,
    /// The last fetch succeeded
    Resolved(T),
    /// The last fetch failed; no data is shown
    Failed,
}

impl<T> Default for SectionState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> SectionState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The resolved value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Resolved(value) => Some(value),
            _ => None,
        }
    }

    fn settle(&mut self, result: Result<T, ApiError>) -> Option<ApiError> {
        match result {
            Ok(value) => {
                *self = Self::Resolved(value);
                None
            }
            Err(err) => {
                *self = Self::Failed;
                Some(err)
            }
        }
    }
}

/// The three independently loaded sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Quote,
    Analysis,
    News,
    /// Startup health probe (notifications only)
    Health,
}

impl Section {
    /// Title used for failure notifications
    pub fn error_title(self) -> &'static str {
        match self {
            Self::Quote => "Quote Error",
            Self::Analysis => "Analysis Error",
            Self::News => "News Error",
            Self::Health => "API Connection Error",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Quote => "quote",
            Self::Analysis => "analysis",
            Self::News => "news",
            Self::Health => "health",
        };
        f.write_str(name)
    }
}

/// Backend availability as determined at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Checking,
    Online,
    Offline,
}

impl HealthStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Checking => "Checking...",
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

/// A transient, user-facing failure message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub section: Section,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(section: Section, message: impl Into<String>) -> Self {
        Self {
            section,
            title: section.error_title().to_string(),
            message: message.into(),
        }
    }
}

/// Handle for one search; completions must present its generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub ticker: String,
}

/// Result of one section fetch
#[derive(Debug)]
pub enum Completion {
    Quote(Result<StockQuote, ApiError>),
    Analysis(Result<ModelResponse, ApiError>),
    News(Result<ModelResponse, ApiError>),
}

impl Completion {
    pub fn section(&self) -> Section {
        match self {
            Self::Quote(_) => Section::Quote,
            Self::Analysis(_) => Section::Analysis,
            Self::News(_) => Section::News,
        }
    }
}

/// What [`DashboardState::apply`] did with a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Written to state
    Applied,
    /// Issued by a superseded search and dropped
    Stale,
}

/// Everything the dashboard renders, in one serializable value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    /// Backend address, shown in the offline banner
    pub backend_url: String,
    pub health: HealthStatus,
    /// Normalized ticker of the most recent search
    pub active_ticker: Option<String>,
    /// Incremented by every search
    pub generation: u64,
    pub quote: SectionState<StockQuote>,
    pub analysis: SectionState<ModelResponse>,
    pub news: SectionState<ModelResponse>,
    /// Pending transient notifications, oldest first
    pub notifications: VecDeque<Notification>,
}

/// Trim and uppercase a raw ticker; `None` when nothing is left
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_uppercase())
}

impl DashboardState {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            ..Self::default()
        }
    }

    /// Start a search: set the active ticker and put every section in `Loading`
    ///
    /// Returns `None` (and changes nothing) for blank input.
    pub fn begin_search(&mut self, raw: &str) -> Option<SearchTicket> {
        let ticker = normalize_ticker(raw)?;

        self.generation += 1;
        self.active_ticker = Some(ticker.clone());
        self.quote = SectionState::Loading;
        self.analysis = SectionState::Loading;
        self.news = SectionState::Loading;

        Some(SearchTicket {
            generation: self.generation,
            ticker,
        })
    }

    /// Write a completion issued under `generation`
    pub fn apply(&mut self, generation: u64, completion: Completion) -> ApplyOutcome {
        let section = completion.section();
        if generation != self.generation {
            debug!(
                "Dropping stale {} result from generation {} (current {})",
                section, generation, self.generation
            );
            return ApplyOutcome::Stale;
        }

        let failure = match completion {
            Completion::Quote(result) => {
                let result = result.map(|quote| self.align_quote_ticker(quote));
                self.quote.settle(result)
            }
            Completion::Analysis(result) => self.analysis.settle(result),
            Completion::News(result) => self.news.settle(result),
        };

        if let Some(err) = failure {
            self.notify(Notification::new(section, err.to_string()));
        }
        ApplyOutcome::Applied
    }

    /// Record the startup health probe result
    pub fn finish_health_check(&mut self, result: Result<HealthResponse, ApiError>) -> HealthStatus {
        self.health = match result {
            Ok(_) => HealthStatus::Online,
            Err(err) => {
                debug!("Health check failed: {}", err);
                self.notify(Notification::new(
                    Section::Health,
                    "Unable to connect to the Finance API. Please ensure the backend is running.",
                ));
                HealthStatus::Offline
            }
        };
        self.health
    }

    /// Quote or analysis still loading
    pub fn is_busy(&self) -> bool {
        self.quote.is_loading() || self.analysis.is_loading()
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }

    /// Remove and return all pending notifications
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    fn align_quote_ticker(&self, mut quote: StockQuote) -> StockQuote {
        if let Some(active) = &self.active_ticker {
            if &quote.ticker != active {
                warn!(
                    "Backend returned quote for {} while {} is active",
                    quote.ticker, active
                );
                quote.ticker.clone_from(active);
            }
        }
        quote
    }
}
