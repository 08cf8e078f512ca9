//! Request orchestration for the dashboard
//!
//! [`DashboardController`] owns the shared [`DashboardState`] and the chat
//! transcript and drives every backend call. It is cheap to clone; clones
//! share the same state, so a search can run on a background task while the
//! front-end keeps rendering snapshots.

use crate::chat::{ChatMessage, ChatSession};
use crate::error::Result;
use crate::state::{
    ApplyOutcome, Completion, DashboardState, HealthStatus, Notification, SearchTicket,
};
use finance_api::{FinanceApi, ModelResponse};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{Mutex, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Drives searches, the health probe, and chat against a [`FinanceApi`]
pub struct DashboardController<A: ?Sized> {
    api: Arc<A>,
    state: Arc<RwLock<DashboardState>>,
    chat: Arc<Mutex<ChatSession>>,
    health: Arc<OnceCell<HealthStatus>>,
}

impl<A: ?Sized> Clone for DashboardController<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            chat: Arc::clone(&self.chat),
            health: Arc::clone(&self.health),
        }
    }
}

impl<A> DashboardController<A>
where
    A: FinanceApi + ?Sized + 'static,
{
    pub fn new(api: Arc<A>) -> Self {
        let state = DashboardState::new(api.base_url());
        Self {
            api,
            state: Arc::new(RwLock::new(state)),
            chat: Arc::new(Mutex::new(ChatSession::new())),
            health: Arc::new(OnceCell::new()),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    /// Probe backend health once
    ///
    /// Later calls return the first result without contacting the backend.
    pub async fn start(&self) -> HealthStatus {
        *self
            .health
            .get_or_init(|| async {
                let result = self.api.check_health().await;
                let status = self.write().finish_health_check(result);
                match status {
                    HealthStatus::Offline => {
                        warn!("Finance API at {} is offline", self.api.base_url());
                    }
                    _ => info!("Finance API at {} is {}", self.api.base_url(), status.label()),
                }
                status
            })
            .await
    }

    /// Health as last determined; `Checking` until [`start`](Self::start) finishes
    pub fn health(&self) -> HealthStatus {
        self.read().health
    }

    /// Search `raw` and wait for all three sections to settle
    ///
    /// Returns the normalized ticker, or `None` for blank input.
    pub async fn search(&self, raw: &str) -> Option<String> {
        let ticket = self.write().begin_search(raw)?;
        let ticker = ticket.ticker.clone();
        self.run_search(ticket).await;
        Some(ticker)
    }

    /// Start a search on a background task
    ///
    /// All sections are `Loading` by the time this returns. Results of an
    /// earlier search still in flight are discarded once they arrive.
    pub fn spawn_search(&self, raw: &str) -> Option<JoinHandle<()>> {
        let ticket = self.write().begin_search(raw)?;
        let controller = self.clone();
        Some(tokio::spawn(async move {
            controller.run_search(ticket).await;
        }))
    }

    async fn run_search(&self, ticket: SearchTicket) {
        let SearchTicket { generation, ticker } = ticket;
        info!("Searching {} (generation {})", ticker, generation);

        let quote = async {
            let result = self.api.get_quote(&ticker).await;
            self.settle(generation, Completion::Quote(result));
        };
        let analysis = async {
            let result = self.api.analyze(&ticker).await;
            self.settle(generation, Completion::Analysis(result));
        };
        let news = async {
            let result = self.api.get_news(Some(ticker.clone())).await;
            self.settle(generation, Completion::News(result));
        };

        tokio::join!(quote, analysis, news);
        debug!("Search for {} finished", ticker);
    }

    fn settle(&self, generation: u64, completion: Completion) {
        let section = completion.section();
        if self.write().apply(generation, completion) == ApplyOutcome::Applied {
            debug!("Applied {} result for generation {}", section, generation);
        }
    }

    /// General market news, independent of the current search
    pub async fn market_news(&self) -> Result<ModelResponse> {
        let news = self.api.get_news(None).await?;
        Ok(news)
    }

    /// Send a chat prompt and return the assistant's reply
    ///
    /// Submissions are serialized. Blank input is ignored.
    pub async fn chat(&self, text: &str) -> Option<ChatMessage> {
        let mut chat = self.chat.lock().await;
        chat.submit(self.api.as_ref(), text).await.cloned()
    }

    /// Copy of the chat transcript
    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.chat.lock().await.messages().to_vec()
    }

    /// Copy of the current dashboard state
    pub fn snapshot(&self) -> DashboardState {
        self.read().clone()
    }

    /// Current state as pretty-printed JSON
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&*self.read())?)
    }

    pub fn take_notifications(&self) -> Vec<Notification> {
        self.write().take_notifications()
    }

    /// Quote or analysis still loading
    pub fn is_busy(&self) -> bool {
        self.read().is_busy()
    }

    fn read(&self) -> RwLockReadGuard<'_, DashboardState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DashboardState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{CHAT_ERROR_MESSAGE, Role};
    use crate::error::DashboardError;
    use crate::state::{Section, SectionState};
    use async_trait::async_trait;
    use finance_api::{ApiError, HealthResponse, MockFinanceApi, StockQuote};
    use std::time::Duration;

    const BASE_URL: &str = "http://localhost:8000";

    fn mock_api() -> MockFinanceApi {
        let mut api = MockFinanceApi::new();
        api.expect_base_url().return_const(BASE_URL.to_string());
        api
    }

    fn unreachable() -> ApiError {
        ApiError::Unreachable {
            base_url: BASE_URL.to_string(),
        }
    }

    #[tokio::test]
    async fn test_start_online() {
        let mut api = mock_api();
        api.expect_check_health().times(1).returning(|| {
            Ok(HealthResponse {
                status: "ok".to_string(),
            })
        });

        let controller = DashboardController::new(Arc::new(api));
        assert_eq!(controller.health(), HealthStatus::Checking);
        assert_eq!(controller.start().await, HealthStatus::Online);
        assert_eq!(controller.health(), HealthStatus::Online);
        assert!(controller.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_offline_backend() {
        let mut api = mock_api();
        api.expect_check_health()
            .times(1)
            .returning(|| Err(unreachable()));
        api.expect_get_quote().returning(|_| Err(unreachable()));
        api.expect_analyze().returning(|_| Err(unreachable()));
        api.expect_get_news().returning(|_| Err(unreachable()));

        let controller = DashboardController::new(Arc::new(api));
        assert_eq!(controller.start().await, HealthStatus::Offline);
        // second call must not probe again
        assert_eq!(controller.start().await, HealthStatus::Offline);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.backend_url, BASE_URL);
        let notifications = controller.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, "API Connection Error");

        controller.search("AAPL").await;
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.quote, SectionState::Failed);
        assert_eq!(snapshot.analysis, SectionState::Failed);
        assert_eq!(snapshot.news, SectionState::Failed);

        let notifications = controller.take_notifications();
        assert_eq!(notifications.len(), 3);
        for notification in &notifications {
            assert!(
                notification
                    .message
                    .starts_with("Unable to connect to the Finance API")
            );
            assert!(notification.message.ends_with(BASE_URL));
        }
    }

    #[tokio::test]
    async fn test_unknown_ticker_fails_only_quote() {
        let mut api = mock_api();
        api.expect_get_quote().times(1).returning(|ticker| {
            Err(ApiError::Status {
                status: 404,
                status_text: "Not Found".to_string(),
                body: format!("Ticker {ticker} not found"),
            })
        });
        api.expect_analyze()
            .times(1)
            .returning(|_| Ok(ModelResponse::new("No coverage for FAKE").with_model("gpt-4")));
        api.expect_get_news()
            .withf(|ticker| ticker.as_deref() == Some("FAKE"))
            .times(1)
            .returning(|_| Ok(ModelResponse::new("No headlines")));

        let controller = DashboardController::new(Arc::new(api));
        let ticker = controller.search("  fake ").await;
        assert_eq!(ticker.as_deref(), Some("FAKE"));

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.active_ticker.as_deref(), Some("FAKE"));
        assert_eq!(snapshot.quote, SectionState::Failed);
        assert_eq!(
            snapshot.analysis.value().unwrap().model.as_deref(),
            Some("gpt-4")
        );
        assert_eq!(snapshot.news.value().unwrap().content, "No headlines");
        assert!(!controller.is_busy());

        let notifications = controller.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].section, Section::Quote);
        assert_eq!(
            notifications[0].message,
            "API Error: 404 Not Found - Ticker FAKE not found"
        );
    }

    #[tokio::test]
    async fn test_blank_search_does_nothing() {
        let controller = DashboardController::new(Arc::new(mock_api()));
        assert!(controller.search("   ").await.is_none());
        assert!(controller.spawn_search("").is_none());
        assert_eq!(controller.snapshot().generation, 0);
    }

    #[tokio::test]
    async fn test_spawn_search_marks_loading_immediately() {
        let mut api = mock_api();
        api.expect_get_quote()
            .returning(|ticker| Ok(StockQuote::new(ticker, 410.5)));
        api.expect_analyze()
            .returning(|_| Ok(ModelResponse::new("Solid")));
        api.expect_get_news()
            .returning(|_| Ok(ModelResponse::new("Quiet day")));

        let controller = DashboardController::new(Arc::new(api));
        let handle = controller.spawn_search("msft").unwrap();

        let snapshot = controller.snapshot();
        assert!(snapshot.quote.is_loading());
        assert!(snapshot.analysis.is_loading());
        assert!(snapshot.news.is_loading());
        assert!(controller.is_busy());

        handle.await.unwrap();
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.quote.value().unwrap().ticker, "MSFT");
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_market_news_leaves_sections_alone() {
        let mut api = mock_api();
        api.expect_get_news()
            .withf(|ticker| ticker.is_none())
            .times(1)
            .returning(|_| Ok(ModelResponse::new("Markets rallied")));

        let controller = DashboardController::new(Arc::new(api));
        let news = controller.market_news().await.unwrap();
        assert_eq!(news.content, "Markets rallied");
        assert_eq!(controller.snapshot().news, SectionState::Idle);
    }

    #[tokio::test]
    async fn test_market_news_error_propagates() {
        let mut api = mock_api();
        api.expect_get_news().returning(|_| Err(unreachable()));

        let controller = DashboardController::new(Arc::new(api));
        let err = controller.market_news().await.unwrap_err();
        assert!(matches!(err, DashboardError::Api(ApiError::Unreachable { .. })));
        assert!(controller.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let mut api = mock_api();
        let mut replies = vec![
            Err(ApiError::Decode {
                endpoint: "/prompt".to_string(),
                reason: "expected value".to_string(),
            }),
            Ok(ModelResponse::new("P/E is price over earnings per share").with_model("gpt-4")),
        ];
        api.expect_send_prompt()
            .times(2)
            .returning(move |_| replies.pop().unwrap());

        let controller = DashboardController::new(Arc::new(api));
        let reply = controller.chat("What is P/E ratio?").await.unwrap();
        assert_eq!(reply.model.as_deref(), Some("gpt-4"));
        assert!(controller.chat(" ").await.is_none());
        let reply = controller.chat("And EV/EBITDA?").await.unwrap();
        assert_eq!(reply.content, CHAT_ERROR_MESSAGE);

        let transcript = controller.transcript().await;
        let roles: Vec<_> = transcript.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(transcript[0].content, "What is P/E ratio?");
        // chat failures are shown inline, not as notifications
        assert!(controller.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_json() {
        let controller = DashboardController::new(Arc::new(mock_api()));
        let json = controller.snapshot_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["backend_url"], BASE_URL);
        assert_eq!(value["quote"]["state"], "idle");
    }

    /// Answers every call after a per-ticker delay
    struct DelayedApi;

    impl DelayedApi {
        async fn wait(ticker: &str) {
            let millis = if ticker == "AAPL" { 500 } else { 50 };
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }

    #[async_trait]
    impl FinanceApi for DelayedApi {
        fn base_url(&self) -> String {
            BASE_URL.to_string()
        }

        async fn get_quote(&self, ticker: &str) -> finance_api::Result<StockQuote> {
            Self::wait(ticker).await;
            Ok(StockQuote::new(ticker, 100.0).with_change(1.0, 1.0))
        }

        async fn analyze(&self, ticker: &str) -> finance_api::Result<ModelResponse> {
            Self::wait(ticker).await;
            Ok(ModelResponse::new(format!("Analysis of {ticker}")))
        }

        async fn get_news(&self, ticker: Option<String>) -> finance_api::Result<ModelResponse> {
            let ticker = ticker.unwrap_or_default();
            Self::wait(&ticker).await;
            Err(ApiError::Status {
                status: 503,
                status_text: "Service Unavailable".to_string(),
                body: format!("no news for {ticker}"),
            })
        }

        async fn send_prompt(&self, _prompt: &str) -> finance_api::Result<ModelResponse> {
            Ok(ModelResponse::new("ok"))
        }

        async fn check_health(&self) -> finance_api::Result<HealthResponse> {
            Ok(HealthResponse {
                status: "ok".to_string(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_searches_keep_latest() {
        let controller = DashboardController::new(Arc::new(DelayedApi));

        let aapl = controller.spawn_search("AAPL").unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let tsla = controller.spawn_search("TSLA").unwrap();

        tsla.await.unwrap();
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.active_ticker.as_deref(), Some("TSLA"));
        assert_eq!(snapshot.quote.value().unwrap().ticker, "TSLA");
        assert_eq!(controller.take_notifications().len(), 1);

        // AAPL resolves last and must not overwrite anything
        aapl.await.unwrap();
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.active_ticker.as_deref(), Some("TSLA"));
        assert_eq!(snapshot.quote.value().unwrap().ticker, "TSLA");
        assert_eq!(
            snapshot.analysis.value().unwrap().content,
            "Analysis of TSLA"
        );
        assert_eq!(snapshot.news, SectionState::Failed);
        assert!(controller.take_notifications().is_empty());
    }
}
