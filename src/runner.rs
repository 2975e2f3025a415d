//! Run orchestration: iterate configured events and pages, evaluate each
//! one, dedupe, notify, and report.
//!
//! Events and URLs are processed sequentially in configured order, with a
//! courtesy pacing delay between fetches. A fetch failure degrades to a
//! per-URL diagnostic; only configuration problems abort a run (and those
//! are caught before this module is reached).

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{EventConfig, MonitorConfig};
use crate::evaluate::{evaluate, Finding};
use crate::extract::visible_text;
use crate::fetch::PageSource;
use crate::keywords::{classify, normalize};
use crate::notify::{NotificationEvent, NotifierMux};
use crate::signals::extract_opening_date;
use crate::state::{signature, StateStore};

/// Machine-readable outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub triggered: bool,
    pub new_alerts: usize,
    #[serde(skip)]
    pub details: Vec<String>,
}

impl RunSummary {
    /// The single summary line an external scheduler consumes.
    pub fn to_json_line(&self) -> String {
        serde_json::json!({
            "triggered": self.triggered,
            "new_alerts_count": self.new_alerts,
        })
        .to_string()
    }
}

/// Evaluate one page's text against one event's configuration.
fn evaluate_page(
    ev: &EventConfig,
    url: &str,
    page_text: &str,
    window_days: i64,
    now: DateTime<Utc>,
) -> Finding {
    let low = normalize(page_text);
    let hits = classify(&low, &ev.keywords_any, &ev.keywords_block);
    let opening = extract_opening_date(page_text, ev.locale);
    evaluate(&ev.name, url, &hits, opening, window_days, now.date_naive(), now)
}

/// One full monitoring pass over the configured events.
///
/// `now` is injected so dedupe and window arithmetic are deterministic
/// under test; production passes `Utc::now()`. State persistence is the
/// caller's job (`StateStore::save_if_dirty`), after this returns.
pub async fn run_once(
    cfg: &MonitorConfig,
    source: &dyn PageSource,
    sinks: &NotifierMux,
    state: &mut StateStore,
    now: DateTime<Utc>,
) -> RunSummary {
    let mut details = Vec::new();
    let mut new_alerts = 0usize;
    let mut recorded_any = false;

    for ev in &cfg.events {
        for url in &ev.urls {
            let raw = match source.fetch_text(url).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(event = %ev.name, url = %url, error = %e, "fetch failed");
                    details.push(format!("{} — {}: fetch failed ({})", ev.name, url, e));
                    pace(cfg.pacing_secs).await;
                    continue;
                }
            };

            let text = visible_text(&raw);
            let finding = evaluate_page(ev, url, &text, cfg.window_days, now);
            debug!(event = %ev.name, url = %url, status = ?finding.status, notify = finding.notify, "evaluated");

            if finding.notify {
                let sig = signature(url, &finding.reason);
                if state.should_notify(&sig, now, cfg.dedupe_days) {
                    let notification = NotificationEvent::new(&ev.name, url, &finding.reason, now);
                    sinks.send_all(&notification).await;
                    // Recorded even when a sink failed: delivery is
                    // best-effort and must not re-alert every run.
                    state.record(&sig, now);
                    recorded_any = true;
                    new_alerts += 1;
                    info!(event = %ev.name, url = %url, reason = %finding.reason, "notified");
                    details.push(format!("{} — {}: notified ({})", ev.name, url, finding.reason));
                } else {
                    debug!(event = %ev.name, url = %url, "duplicate suppressed");
                    details.push(format!("{} — {}: duplicate suppressed", ev.name, url));
                }
            } else {
                details.push(format!(
                    "{} — {}: {:?} ({})",
                    ev.name, url, finding.status, finding.reason
                ));
            }

            pace(cfg.pacing_secs).await;
        }
    }

    if recorded_any {
        state.prune(now, cfg.retention_days);
    }

    RunSummary {
        triggered: new_alerts > 0,
        new_alerts,
        details,
    }
}

async fn pace(secs: u64) {
    if secs > 0 {
        tokio::time::sleep(std::time::Duration::from_secs(secs)).await;
    }
}
