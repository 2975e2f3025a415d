//! Monitor configuration: a TOML document naming the events to watch,
//! their keyword lists, and the window/dedupe/pacing knobs.
//!
//! Schema violations are the only fatal errors in the system; they abort
//! the run before any network I/O.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;

use crate::dates::Locale;

pub const ENV_CONFIG_PATH: &str = "REGWATCH_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/monitor.toml";

fn default_window_days() -> i64 {
    30
}
fn default_dedupe_days() -> i64 {
    3
}
fn default_retention_days() -> i64 {
    180
}
fn default_pacing_secs() -> u64 {
    1
}

/// One monitored event: a name, the pages to scan, and its keyword sets.
/// Immutable during a run.
#[derive(Debug, Clone, Deserialize)]
pub struct EventConfig {
    pub name: String,
    pub urls: Vec<String>,
    #[serde(default)]
    pub keywords_any: Vec<String>,
    #[serde(default)]
    pub keywords_block: Vec<String>,
    #[serde(default)]
    pub locale: Locale,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_window_days")]
    pub window_days: i64,
    #[serde(default = "default_dedupe_days")]
    pub dedupe_days: i64,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default = "default_pacing_secs")]
    pub pacing_secs: u64,
    #[serde(default)]
    pub events: Vec<EventConfig>,
}

impl MonitorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: MonitorConfig = toml::from_str(s).context("parsing monitor config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading monitor config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.events.is_empty() {
            bail!("monitor config defines no events");
        }
        let mut names = BTreeSet::new();
        for ev in &self.events {
            if ev.name.trim().is_empty() {
                bail!("event with empty name");
            }
            if ev.urls.is_empty() {
                bail!("event '{}' has no urls", ev.name);
            }
            if !names.insert(ev.name.as_str()) {
                bail!("duplicate event name '{}'", ev.name);
            }
        }
        if self.window_days < 0 || self.dedupe_days < 0 || self.retention_days < 0 {
            bail!("window_days, dedupe_days and retention_days must be non-negative");
        }
        Ok(())
    }
}
