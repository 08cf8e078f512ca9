//! Finance Guru dashboard
//!
//! Orchestrates the backend calls behind a stock search, keeps the resulting
//! state, and renders it as terminal text.
//!
//! # Features
//!
//! - **Concurrent search**: quote, analysis, and news are fetched in parallel
//!   and settle independently
//! - **Latest search wins**: results of a superseded search are dropped
//! - **Chat**: a serialized conversation with the AI finance assistant
//! - **Markdown**: analysis and news content rendered for the terminal
//!
//! # Example
//!
//! ```rust,no_run
//! use finance_api::FinanceClient;
//! use finance_dashboard::{DashboardController, view};
//! use std::sync::Arc;
//!
//! # async fn run() -> finance_api::Result<()> {
//! let client = Arc::new(FinanceClient::local()?);
//! let controller = DashboardController::new(client);
//! controller.start().await;
//! controller.search("AAPL").await;
//! println!("{}", view::dashboard(&controller.snapshot()));
//! # Ok(())
//! # }
//! ```

pub mod chat;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod markdown;
pub mod state;
pub mod view;

pub use chat::{CHAT_ERROR_MESSAGE, ChatMessage, ChatSession, Role};
pub use commands::Command;
pub use config::{DashboardConfig, DashboardConfigBuilder};
pub use controller::DashboardController;
pub use error::{DashboardError, Result};
pub use state::{
    ApplyOutcome, Completion, DashboardState, HealthStatus, Notification, SearchTicket, Section,
    SectionState,
};
