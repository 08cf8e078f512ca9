//! Finance Guru terminal dashboard
//!
//! An interactive front-end for the Finance Guru backend: quotes, AI analysis,
//! news, and a chat with the finance assistant.
//!
//! # Usage
//!
//! ```bash
//! # Point at the backend (defaults to http://localhost:8000)
//! export FINANCE_API_URL="http://localhost:8000"
//!
//! # Interactive dashboard
//! cargo run --bin finance-guru
//!
//! # One-shot search or prompt
//! cargo run --bin finance-guru -- --ticker AAPL
//! cargo run --bin finance-guru -- --prompt "What is P/E ratio?" --json
//! ```

use clap::Parser;
use finance_api::{FinanceApi, FinanceClient};
use finance_dashboard::{Command, DashboardConfig, DashboardController, DashboardError, view};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type Controller = DashboardController<FinanceClient>;

#[derive(Parser, Debug)]
#[command(name = "finance-guru")]
#[command(about = "AI-powered financial analysis dashboard", long_about = None)]
struct Args {
    /// Backend address
    #[arg(long, env = "FINANCE_API_URL")]
    base_url: Option<String>,

    /// Search one ticker, print the dashboard, and exit
    #[arg(long, conflicts_with = "prompt")]
    ticker: Option<String>,

    /// Send one chat prompt, print the transcript, and exit
    #[arg(long)]
    prompt: Option<String>,

    /// Print one-shot results as JSON
    #[arg(long)]
    json: bool,

    /// Show times on chat messages
    #[arg(long)]
    show_timestamps: bool,
}

fn print_banner(config: &DashboardConfig) {
    println!(
        r"
╔══════════════════════════════════════════════════════════════╗
║                        Finance Guru                          ║
║            AI-Powered Financial Analysis Dashboard           ║
║                                                              ║
║  Commands:                                                   ║
║    /search <ticker>   - Quote, analysis, and news            ║
║    /popular           - Popular tickers (/1, /2, ...)        ║
║    /market            - General market news                  ║
║    /help              - Show help                            ║
║    /exit              - Exit                                 ║
║                                                              ║
║  Or ask the assistant anything:                              ║
║    What is P/E ratio?                                        ║
╚══════════════════════════════════════════════════════════════╝
"
    );
    println!("Backend: {}", config.base_url);
    println!("{}\n", view::popular(&config.popular_tickers));
}

fn print_notifications(controller: &Controller) {
    for notification in controller.take_notifications() {
        eprintln!("{}", view::notification(&notification));
    }
}

/// What the REPL does after a command
enum Flow {
    Continue,
    Exit,
}

async fn execute(
    controller: &Controller,
    config: &DashboardConfig,
    command: Command,
) -> finance_dashboard::Result<Flow> {
    debug!("Executing: {}", command.description());
    match command {
        Command::Search { ticker } => search(controller, &ticker).await,
        Command::Pick { index } => {
            let ticker = config.popular(index).ok_or_else(|| {
                DashboardError::Command(format!(
                    "No popular ticker #{index}; there are {}",
                    config.popular_tickers.len()
                ))
            })?;
            search(controller, ticker).await;
        }
        Command::Popular => println!("{}", view::popular(&config.popular_tickers)),
        Command::Market => {
            let news = controller.market_news().await?;
            println!("{}", view::market_news(&news));
        }
        Command::Show => println!("{}", view::dashboard(&controller.snapshot())),
        Command::Status => println!("{}", view::status(&controller.snapshot())),
        Command::Chat => {
            let transcript = controller.transcript().await;
            println!("{}", view::transcript(&transcript, config.show_timestamps));
        }
        Command::Json => println!("{}", controller.snapshot_json()?),
        Command::Help => println!("{}", Command::help_text()),
        Command::Exit => return Ok(Flow::Exit),
        Command::Prompt { text } => {
            if let Some(reply) = controller.chat(&text).await {
                println!("{}", view::chat_message(&reply, config.show_timestamps));
            }
        }
    }
    Ok(Flow::Continue)
}

async fn search(controller: &Controller, ticker: &str) {
    if let Some((status, handle)) = start_search(controller, ticker) {
        println!("{status}");
        println!("{}", finish_search(controller, handle).await);
    }
    print_notifications(controller);
}

/// Kick off a background search and return the search line while it runs
fn start_search<A>(
    controller: &DashboardController<A>,
    ticker: &str,
) -> Option<(String, JoinHandle<()>)>
where
    A: FinanceApi + ?Sized + 'static,
{
    let handle = controller.spawn_search(ticker)?;
    Some((view::search_status(&controller.snapshot()), handle))
}

/// Wait for the search behind `handle` and render the settled dashboard
async fn finish_search<A>(controller: &DashboardController<A>, handle: JoinHandle<()>) -> String
where
    A: FinanceApi + ?Sized + 'static,
{
    if let Err(e) = handle.await {
        warn!("Search task failed: {}", e);
    }
    view::dashboard(&controller.snapshot())
}

async fn run_once(controller: &Controller, config: &DashboardConfig, args: &Args) -> anyhow::Result<()> {
    if let Some(ticker) = &args.ticker {
        controller.search(ticker).await;
        if args.json {
            println!("{}", controller.snapshot_json()?);
        } else {
            println!("{}", view::dashboard(&controller.snapshot()));
        }
    } else if let Some(prompt) = &args.prompt {
        controller.chat(prompt).await;
        let transcript = controller.transcript().await;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&transcript)?);
        } else {
            println!("{}", view::transcript(&transcript, config.show_timestamps));
        }
    }
    print_notifications(controller);
    Ok(())
}

async fn run_repl(controller: &Controller, config: &DashboardConfig) -> anyhow::Result<()> {
    print_banner(config);
    println!("{}\n", view::header(controller.health()));

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}", config.prompt);
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let result = match Command::parse(input) {
            Ok(command) => execute(controller, config, command).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(Flow::Continue) => println!(),
            Ok(Flow::Exit) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => eprintln!("Error: {e}\n"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    finance_utils::init_tracing();

    let args = Args::parse();

    let mut builder = DashboardConfig::builder();
    if let Some(url) = &args.base_url {
        builder = builder.base_url(url.as_str());
    }
    if args.show_timestamps {
        builder = builder.show_timestamps(true);
    }
    let config = builder.with_env().build()?;

    info!("Starting finance-guru against {}", config.base_url);

    let client = Arc::new(FinanceClient::new(config.base_url.as_str())?);
    let controller = DashboardController::new(client);
    controller.start().await;

    if args.ticker.is_some() || args.prompt.is_some() {
        run_once(&controller, &config, &args).await
    } else {
        if controller.health() == finance_dashboard::HealthStatus::Offline {
            println!("{}\n", view::offline_banner(&config.base_url));
        }
        print_notifications(&controller);
        run_repl(&controller, &config).await
    }
}
