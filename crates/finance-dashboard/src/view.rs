//! Terminal rendering of dashboard state
//!
//! Every function here is pure: it takes a piece of state and returns the
//! text to print. Nothing in this module touches the network or the terminal.

use crate::chat::{ChatMessage, Role};
use crate::format::{Trend, format_change, format_clock, format_percent, format_price, format_timestamp};
use crate::markdown;
use crate::state::{DashboardState, HealthStatus, Notification, SectionState};
use finance_api::{ModelResponse, NewsItem, StockQuote};
use std::fmt::Write;

pub const TITLE: &str = "Finance Guru";
pub const SUBTITLE: &str = "AI-Powered Financial Analysis Dashboard";

const RULE_WIDTH: usize = 64;

/// Section heading padded with a rule, e.g. `── AI Analysis [gpt-4] ─────`
pub fn heading(title: &str, badge: Option<&str>) -> String {
    let mut line = format!("── {title} ");
    if let Some(badge) = badge {
        let _ = write!(line, "[{badge}] ");
    }
    let used = line.chars().count();
    line.push_str(&"─".repeat(RULE_WIDTH.saturating_sub(used)));
    line
}

/// `[API online]`, `[API offline]`, or `[API Checking...]`
pub fn api_badge(health: HealthStatus) -> String {
    format!("[API {}]", health.label())
}

pub fn header(health: HealthStatus) -> String {
    format!("{TITLE}  {}\n{SUBTITLE}", api_badge(health))
}

/// Advisory shown while the backend is offline
pub fn offline_banner(backend_url: &str) -> String {
    format!(
        "⚠ The Finance API is offline. Please ensure the backend is running on {backend_url} and try again."
    )
}

/// Search bar line: busy indicator or the active ticker
pub fn search_status(state: &DashboardState) -> String {
    if state.is_busy() {
        return "Analyzing...".to_string();
    }
    match &state.active_ticker {
        Some(ticker) => format!("Ticker: {ticker}"),
        None => "Enter stock ticker (e.g., AAPL, TSLA) with /search <ticker>".to_string(),
    }
}

pub fn quote_section(quote: &SectionState<StockQuote>) -> String {
    match quote {
        SectionState::Resolved(quote) => quote_card(quote),
        SectionState::Loading => format!("{}\nLoading quote...", heading("Stock Quote", None)),
        SectionState::Idle | SectionState::Failed => format!(
            "{}\nSearch for a stock to see live pricing data",
            heading("Stock Quote", None)
        ),
    }
}

/// Price card for a resolved quote
///
/// The change line is shown only when both change and percentage are known.
pub fn quote_card(quote: &StockQuote) -> String {
    let trend = Trend::from_change(quote.change);
    let badge = format!("{} {}", trend.arrow(), quote.currency);

    let mut out = heading(&quote.ticker, Some(&badge));
    out.push('\n');
    out.push_str(&format_price(quote.price, &quote.currency));

    if let (Some(change), Some(change_pct)) = (quote.change, quote.change_pct) {
        let _ = write!(
            out,
            "\n{} {} ({}) {}",
            trend.arrow(),
            format_change(change, trend),
            format_percent(change_pct, trend),
            trend.label()
        );
    }

    if let Some(timestamp) = &quote.timestamp {
        let _ = write!(out, "\nLast updated: {}", format_timestamp(timestamp));
    }
    out
}

pub fn analysis_section(analysis: &SectionState<ModelResponse>) -> String {
    match analysis {
        SectionState::Resolved(response) => format!(
            "{}\n{}",
            heading("AI Analysis", response.model.as_deref()),
            markdown::to_terminal(&response.content)
        ),
        SectionState::Loading => {
            format!("{}\nGenerating analysis...", heading("AI Analysis", None))
        }
        SectionState::Idle | SectionState::Failed => format!(
            "{}\nEnter a stock ticker to get comprehensive financial analysis",
            heading("AI Analysis", None)
        ),
    }
}

pub fn news_section(news: &SectionState<ModelResponse>, ticker: Option<&str>) -> String {
    let title = heading("Latest News", ticker);
    match news {
        SectionState::Resolved(response) => format!("{title}\n{}", news_body(response)),
        SectionState::Loading => format!("{title}\nLoading news..."),
        SectionState::Idle | SectionState::Failed => {
            format!("{title}\nSearch for a stock to see related news")
        }
    }
}

/// General market news returned by `/market`
pub fn market_news(response: &ModelResponse) -> String {
    format!("{}\n{}", heading("Market News", None), news_body(response))
}

// Structured items become cards, anything else is markdown
fn news_body(response: &ModelResponse) -> String {
    let mut out = match response.news_items() {
        Some(items) if !items.is_empty() => items
            .iter()
            .map(news_card)
            .collect::<Vec<_>>()
            .join("\n\n"),
        _ => markdown::to_terminal(&response.content),
    };
    if let Some(model) = &response.model {
        let _ = write!(out, "\n[{model}]");
    }
    out
}

pub fn news_card(item: &NewsItem) -> String {
    let mut out = format!("▪ {}", item.title);
    if item.url.is_some() {
        out.push_str(" ↗");
    }
    let _ = write!(out, "\n  {}\n  {} • {}", item.summary, item.source, item.date);
    if let Some(sentiment) = item.sentiment {
        let _ = write!(out, "  [{}]", sentiment.as_str());
    }
    if let Some(url) = &item.url {
        let _ = write!(out, "\n  {url}");
    }
    out
}

pub fn chat_message(message: &ChatMessage, show_timestamps: bool) -> String {
    let mut out = match message.role {
        Role::User => format!("you> {}", message.content),
        Role::Assistant => format!("guru> {}", markdown::to_terminal(&message.content)),
    };

    let mut meta = Vec::new();
    if show_timestamps {
        meta.push(format_clock(message.timestamp));
    }
    if let Some(model) = &message.model {
        meta.push(format!("[{model}]"));
    }
    if !meta.is_empty() {
        let _ = write!(out, "\n      {}", meta.join(" "));
    }
    out
}

pub fn transcript(messages: &[ChatMessage], show_timestamps: bool) -> String {
    let mut out = heading("AI Chat", None);
    out.push('\n');
    if messages.is_empty() {
        out.push_str("Start a conversation with the AI finance assistant");
        return out;
    }
    let rendered: Vec<_> = messages
        .iter()
        .map(|message| chat_message(message, show_timestamps))
        .collect();
    out.push_str(&rendered.join("\n\n"));
    out
}

pub fn notification(notification: &Notification) -> String {
    format!("✖ {}: {}", notification.title, notification.message)
}

/// Numbered list for `/popular` and `/<n>`
pub fn popular(tickers: &[String]) -> String {
    let entries: Vec<_> = tickers
        .iter()
        .enumerate()
        .map(|(i, ticker)| format!("/{} {}", i + 1, ticker))
        .collect();
    format!("Popular: {}", entries.join("  "))
}

pub fn status(state: &DashboardState) -> String {
    let section = |name: &str, loading: bool| {
        format!("  {name:<9}{}", if loading { "loading" } else { "ready" })
    };
    let mut out = format!(
        "Backend: {} {}\nTicker: {}",
        state.backend_url,
        api_badge(state.health),
        state.active_ticker.as_deref().unwrap_or("-")
    );
    for (name, loading) in [
        ("quote", state.quote.is_loading()),
        ("analysis", state.analysis.is_loading()),
        ("news", state.news.is_loading()),
    ] {
        out.push('\n');
        out.push_str(&section(name, loading));
    }
    out
}

/// Full dashboard: header, banner, search line, quote, news, analysis
pub fn dashboard(state: &DashboardState) -> String {
    let mut parts = vec![header(state.health)];
    if state.health == HealthStatus::Offline {
        parts.push(offline_banner(&state.backend_url));
    }
    parts.push(search_status(state));
    parts.push(quote_section(&state.quote));
    parts.push(news_section(&state.news, state.active_ticker.as_deref()));
    parts.push(analysis_section(&state.analysis));
    parts.join("\n\n")
}
