//! regwatch — Binary Entrypoint
//! One monitoring pass: load config and state, scan every configured
//! page, notify fresh findings, persist state, print the summary line.
//!
//! Designed to run under an external scheduler (cron / CI workflow); the
//! process either completes a full run or is killed by the scheduler.

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use regwatch::config::{MonitorConfig, DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH};
use regwatch::fetch::{HttpFetcher, DEFAULT_TIMEOUT_SECS};
use regwatch::notify::NotifierMux;
use regwatch::runner::run_once;
use regwatch::state::StateStore;

const ENV_STATE_PATH: &str = "REGWATCH_STATE";
const DEFAULT_STATE_PATH: &str = ".state/state.json";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("regwatch=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Config errors are the only fatal ones, and they fire before any
    // network I/O.
    let cfg_path =
        std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = MonitorConfig::load(Path::new(&cfg_path))
        .with_context(|| format!("loading monitor config from {cfg_path}"))?;

    let state_path =
        std::env::var(ENV_STATE_PATH).unwrap_or_else(|_| DEFAULT_STATE_PATH.to_string());
    let mut state = StateStore::load(Path::new(&state_path));

    let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT_SECS)?;
    let sinks = NotifierMux::from_env();
    if sinks.is_empty() {
        tracing::info!("no notification sinks configured; findings will only be logged");
    }

    let summary = run_once(&cfg, &fetcher, &sinks, &mut state, Utc::now()).await;
    for line in &summary.details {
        tracing::info!(target: "regwatch::summary", "{line}");
    }

    state
        .save_if_dirty(Path::new(&state_path))
        .with_context(|| format!("persisting state to {state_path}"))?;

    // Machine-readable signal for the calling workflow.
    println!("{}", summary.to_json_line());
    Ok(())
}
