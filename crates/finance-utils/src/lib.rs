//! Shared utilities for finance-guru
//!
//! Logging setup and environment helpers used by the dashboard library and
//! the command-line front-end.

pub mod config;
pub mod logging;

pub use config::{env_flag, env_var};
pub use logging::{DEFAULT_DIRECTIVE, JSON_ENV, init_tracing, init_tracing_with_default};
