//! Tracing subscriber setup
//!
//! The interactive session owns the terminal, so all diagnostics go to a
//! log file in the state directory. Filtering follows `RUST_LOG`, defaulting
//! to `info`.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber, appending to `log_file_path`.
pub fn init(log_file_path: &Path) -> Result<()> {
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("Failed to open log file {}", log_file_path.display()))?;

    build_subscriber(log_file)
        .try_init()
        .context("Tracing subscriber already installed")?;
    Ok(())
}

/// Subscriber shared by the binary and tests
pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_ansi(false).with_writer(Arc::new(log_file));

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}
