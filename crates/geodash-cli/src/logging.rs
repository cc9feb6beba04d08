// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const LOG_ENV: &str = "GEODASH_LOG";

/// Installs the global subscriber. The terminal belongs to the UI, so logs
/// go to `path`. Keep the guard alive until exit or buffered lines are lost.
pub fn init(path: &Path, config_level: &str) -> Result<WorkerGuard> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = build_env_filter(
        std::env::var(LOG_ENV).ok().as_deref(),
        std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        config_level,
    )?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    Ok(guard)
}

/// `GEODASH_LOG` beats `RUST_LOG` beats the configured level. Unparsable
/// env directives fall through; a bad configured level is an error.
fn build_env_filter(
    app_env: Option<&str>,
    rust_env: Option<&str>,
    config_level: &str,
) -> Result<EnvFilter> {
    for directives in [app_env, rust_env].into_iter().flatten() {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return Ok(filter);
        }
    }
    EnvFilter::try_new(config_level)
        .with_context(|| format!("invalid log level {config_level:?} in [log].level"))
}

#[cfg(test)]
mod tests {
    use super::build_env_filter;
    use anyhow::Result;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn app_env_wins_over_rust_log_and_config() -> Result<()> {
        let filter = build_env_filter(Some("geodash_app=trace"), Some("warn"), "info")?;
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
        Ok(())
    }

    #[test]
    fn rust_log_is_used_without_app_env() -> Result<()> {
        let filter = build_env_filter(None, Some("warn"), "info")?;
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
        Ok(())
    }

    #[test]
    fn config_level_is_the_fallback() -> Result<()> {
        let filter = build_env_filter(Some("geodash=loud"), None, "debug")?;
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        Ok(())
    }

    #[test]
    fn bad_config_level_is_reported() {
        let error =
            build_env_filter(None, None, "geodash=loud").expect_err("bad level should fail");
        assert!(format!("{error:#}").contains("[log].level"));
    }
}
