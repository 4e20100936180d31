//! Logging utilities for the Meetbook application.
//!
//! This module provides a standardized approach to logging across all crates
//! in the Meetbook workspace. It installs a `tracing` subscriber that honours
//! `RUST_LOG` and falls back to the configured level.

use tracing::{error, info, level_filters::LevelFilter, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with the default level (INFO).
///
/// # Examples
///
/// ```
/// use meetbook_common::logging;
///
/// logging::init();
/// logging::init_with_level(tracing::Level::DEBUG);
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// Uses `try_init` so calling this more than once (for example from several tests)
/// leaves the first subscriber in place.
pub fn init_with_level(level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Parse a configured level name, defaulting to INFO for unknown values.
pub fn level_from_str(level: Option<&str>) -> Level {
    level
        .and_then(|name| name.parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_str() {
        assert_eq!(level_from_str(Some("debug")), Level::DEBUG);
        assert_eq!(level_from_str(Some("WARN")), Level::WARN);
        assert_eq!(level_from_str(Some("chatty")), Level::INFO);
        assert_eq!(level_from_str(None), Level::INFO);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init();
        init_with_level(Level::DEBUG);
    }
}
