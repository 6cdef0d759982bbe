// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use time::macros::format_description;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;

pub const LOG_ENV: &str = "SHELF_LOG";

/// The terminal belongs to the TUI, so events go to a file.
pub fn init(config: &Config) -> Result<PathBuf> {
    let path = config.log_file()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let directives = filter_directives(env::var(LOG_ENV).ok(), config.log_level());
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid log filter {directives:?} (from {LOG_ENV} or [log].level)"))?;

    let timer = UtcTime::new(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(timer)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    Ok(path)
}

fn filter_directives(env_value: Option<String>, configured: &str) -> String {
    match env_value {
        Some(value) if !value.trim().is_empty() => value,
        _ => configured.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::filter_directives;

    #[test]
    fn env_value_overrides_configured_level() {
        assert_eq!(
            filter_directives(Some("shelf_api=trace".to_owned()), "info"),
            "shelf_api=trace"
        );
    }

    #[test]
    fn blank_env_value_falls_back_to_config() {
        assert_eq!(filter_directives(Some("  ".to_owned()), "warn"), "warn");
        assert_eq!(filter_directives(None, "debug"), "debug");
    }
}
