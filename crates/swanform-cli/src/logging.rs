// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_ENV: &str = "SWANFORM_LOG";
pub const LOG_FILE_PREFIX: &str = "swanform.log";

/// Install a daily rolling file subscriber under `log_dir`.
///
/// The dialog owns the terminal, so nothing is written to stdout or stderr.
/// `SWANFORM_LOG` wins over `configured_filter`.
pub fn init(log_dir: &Path, configured_filter: &str) -> Result<PathBuf> {
    fs::create_dir_all(log_dir).with_context(|| {
        format!(
            "create log directory {} -- set [log].dir to a writable path",
            log_dir.display()
        )
    })?;

    let filter = resolve_filter(std::env::var(LOG_ENV).ok(), configured_filter)?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let timer = UtcTime::new(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_timer(timer),
        )
        .try_init()
        .context("install log subscriber")?;

    tracing::info!(log_dir = %log_dir.display(), "swanform starting");
    Ok(log_dir.join(LOG_FILE_PREFIX))
}

fn resolve_filter(env_value: Option<String>, configured: &str) -> Result<EnvFilter> {
    match env_value.filter(|value| !value.trim().is_empty()) {
        Some(value) => EnvFilter::try_new(&value)
            .with_context(|| format!("invalid {LOG_ENV} filter {value:?}")),
        None => EnvFilter::try_new(configured)
            .with_context(|| format!("invalid [log].filter {configured:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_filter;
    use anyhow::Result;

    #[test]
    fn env_filter_overrides_configured_filter() -> Result<()> {
        let filter = resolve_filter(Some("swanform_app=debug".to_owned()), "warn")?;
        assert_eq!(filter.to_string(), "swanform_app=debug");
        Ok(())
    }

    #[test]
    fn blank_env_falls_back_to_configured_filter() -> Result<()> {
        let filter = resolve_filter(Some("  ".to_owned()), "warn")?;
        assert_eq!(filter.to_string(), "warn");

        let filter = resolve_filter(None, "info")?;
        assert_eq!(filter.to_string(), "info");
        Ok(())
    }

    #[test]
    fn invalid_filter_names_its_source() {
        let error = resolve_filter(None, "swanform_app=loud")
            .expect_err("unknown level should fail");
        assert!(error.to_string().contains("[log].filter"));

        let error = resolve_filter(Some("=[".to_owned()), "info")
            .expect_err("malformed env filter should fail");
        assert!(error.to_string().contains("SWANFORM_LOG"));
    }
}
