//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Directive used when `RUST_LOG` is not set
pub const DEFAULT_DIRECTIVE: &str = "warn,finance_dashboard=info,finance_api=info";

/// Set to a truthy value to emit JSON log lines
pub const JSON_ENV: &str = "FINANCE_LOG_JSON";

/// Initialize tracing subscriber with the default configuration
pub fn init_tracing() {
    init_tracing_with_default(DEFAULT_DIRECTIVE);
}

/// Initialize tracing with a fallback directive for when `RUST_LOG` is unset.
///
/// Output goes to stderr so rendered dashboards on stdout stay clean; JSON
/// when `FINANCE_LOG_JSON` is set. Calling this more than once is a no-op.
pub fn init_tracing_with_default(default_directive: &str) {
    let json = crate::config::env_flag(JSON_ENV).unwrap_or(false);
    let registry = tracing_subscriber::registry().with(build_filter(default_directive));
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let _ = if json {
        registry.with(fmt.json()).try_init()
    } else {
        registry.with(fmt).try_init()
    };
}

fn build_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}
