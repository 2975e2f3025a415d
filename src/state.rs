//! Dedupe records and snapshot persistence.
//!
//! One live record per signature, where the signature is a short sha256
//! digest of `url|reason`. Identical findings inside the dedupe window are
//! suppressed; any change in the reason text produces a new signature and
//! alerts independently. The whole store round-trips through a flat JSON
//! snapshot, loaded at run start and rewritten atomically at run end when
//! it changed.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Deterministic dedupe key for a finding: first 16 hex chars of
/// sha256("url|reason").
pub fn signature(url: &str, reason: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(b"|");
    hasher.update(reason.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupeRecord {
    pub signature: String,
    pub last_notified_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    records: HashMap<String, DedupeRecord>,
}

/// In-memory dedupe state for one run; explicit lifecycle: load at start,
/// mutate in memory, persist at end if dirty.
#[derive(Debug, Default)]
pub struct StateStore {
    records: HashMap<String, DedupeRecord>,
    dirty: bool,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot from disk. An absent or unreadable file is
    /// non-fatal and yields an empty store.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(_) => {
                debug!(path = %path.display(), "no state snapshot, starting empty");
                return Self::new();
            }
        };
        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snap) => Self { records: snap.records, dirty: false },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "state snapshot corrupt, resetting to empty");
                Self::new()
            }
        }
    }

    /// True unless a record with the same signature was notified less than
    /// `dedupe_days` ago. Does NOT mutate state.
    pub fn should_notify(&self, sig: &str, now: DateTime<Utc>, dedupe_days: i64) -> bool {
        match self.records.get(sig) {
            None => true,
            Some(rec) => now - rec.last_notified_at >= Duration::days(dedupe_days),
        }
    }

    /// Upsert the signature's timestamp after a successful notification.
    /// `last_notified_at` never moves backwards for a given signature.
    pub fn record(&mut self, sig: &str, now: DateTime<Utc>) {
        let entry = self
            .records
            .entry(sig.to_string())
            .or_insert_with(|| DedupeRecord {
                signature: sig.to_string(),
                last_notified_at: now,
            });
        entry.last_notified_at = entry.last_notified_at.max(now);
        self.dirty = true;
    }

    /// Drop records older than the retention horizon to bound snapshot
    /// growth.
    pub fn prune(&mut self, now: DateTime<Utc>, retention_days: i64) {
        let cutoff = now - Duration::days(retention_days);
        let before = self.records.len();
        self.records.retain(|_, rec| rec.last_notified_at >= cutoff);
        if self.records.len() != before {
            debug!(removed = before - self.records.len(), "pruned stale dedupe records");
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, sig: &str) -> bool {
        self.records.contains_key(sig)
    }

    /// Write the snapshot atomically (temp file + rename) when the store
    /// was mutated this run.
    pub fn save_if_dirty(&self, path: &Path) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating state dir {}", parent.display()))?;
            }
        }
        let snap = Snapshot { records: self.records.clone() };
        let body = serde_json::to_string_pretty(&snap).context("serializing state snapshot")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("renaming {} into place", tmp.display()))?;
        Ok(())
    }
}
