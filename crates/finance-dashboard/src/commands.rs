//! Command parsing for the interactive dashboard

use crate::error::{DashboardError, Result};
use crate::state::normalize_ticker;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Quote, analysis, and news for a ticker
    Search { ticker: String },
    /// List the popular tickers
    Popular,
    /// Search the n-th popular ticker (1-based)
    Pick { index: usize },
    /// General market news
    Market,
    /// Redraw the dashboard
    Show,
    /// Backend health and pending activity
    Status,
    /// Show the chat transcript
    Chat,
    /// Dump the dashboard state as JSON
    Json,
    /// Show help
    Help,
    /// Exit the dashboard
    Exit,
    /// Free-form question for the assistant (not a command)
    Prompt { text: String },
}

impl Command {
    /// Parse a command from user input
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(DashboardError::Command("Empty input".to_string()));
        }

        let Some(rest) = input.strip_prefix('/') else {
            return Ok(Command::Prompt {
                text: input.to_string(),
            });
        };

        let parts: Vec<&str> = rest.split_whitespace().collect();
        let Some(first) = parts.first() else {
            return Err(DashboardError::Command("Empty command".to_string()));
        };

        let cmd = first.to_lowercase();
        let args = &parts[1..];

        if let Ok(index) = cmd.parse::<usize>() {
            if index == 0 {
                return Err(DashboardError::Command(
                    "Popular tickers are numbered from 1".to_string(),
                ));
            }
            return Ok(Command::Pick { index });
        }

        match cmd.as_str() {
            "search" | "s" | "analyze" | "a" => {
                let ticker = args
                    .first()
                    .and_then(|raw| normalize_ticker(raw))
                    .ok_or_else(|| {
                        DashboardError::Command("Missing ticker for search command".to_string())
                    })?;
                Ok(Command::Search { ticker })
            }
            "popular" | "p" => Ok(Command::Popular),
            "market" | "m" => Ok(Command::Market),
            "show" => Ok(Command::Show),
            "status" => Ok(Command::Status),
            "chat" | "c" => Ok(Command::Chat),
            "json" => Ok(Command::Json),
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            _ => Err(DashboardError::Command(format!(
                "Unknown command: /{cmd}. Type /help for available commands."
            ))),
        }
    }

    /// Get help text
    pub fn help_text() -> &'static str {
        r"
Finance Guru - Commands

Dashboard:
  /search <ticker>       Quote, AI analysis, and news for a ticker
  /popular               List popular tickers
  /<n>                   Search the n-th popular ticker (e.g. /1)
  /market                General market news
  /show                  Redraw the dashboard
  /status                Backend health and pending requests
  /json                  Dump the dashboard state as JSON

Chat:
  <question>             Anything not starting with / goes to the assistant
  /chat                  Show the conversation so far

Other:
  /help                  Show help
  /exit                  Exit

Aliases:
  /s, /a, /analyze = /search   /p = /popular   /m = /market
  /c = /chat   /h, /? = /help   /q, /quit = /exit
"
    }

    /// Get a short description of the command
    pub fn description(&self) -> &'static str {
        match self {
            Command::Search { .. } => "Search a ticker",
            Command::Popular => "List popular tickers",
            Command::Pick { .. } => "Search a popular ticker",
            Command::Market => "General market news",
            Command::Show => "Redraw the dashboard",
            Command::Status => "Backend status",
            Command::Chat => "Show chat transcript",
            Command::Json => "Dump state as JSON",
            Command::Help => "Show help",
            Command::Exit => "Exit",
            Command::Prompt { .. } => "Ask the assistant",
        }
    }
}
