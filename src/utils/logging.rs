//! Logging initialization.

use env_logger::Builder;
use log::LevelFilter;
use std::env;

use crate::error::BotError;

/// Initialize the logger. `RUST_LOG` wins; otherwise the configured level
/// applies to the whole crate.
pub fn init(configured_level: &str) -> Result<(), BotError> {
    let mut builder = Builder::from_default_env();

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| configured_level.to_string());

    let level_filter = match log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    builder.filter_level(level_filter).format_timestamp_millis().init();

    log::info!("logging initialized: level = {}", log_level);

    Ok(())
}
