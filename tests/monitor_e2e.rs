// tests/monitor_e2e.rs
//
// Full pipeline over a stub page source: detection on the first run,
// dedupe suppression on an immediate second run with persisted state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use regwatch::config::MonitorConfig;
use regwatch::fetch::{FetchError, PageSource};
use regwatch::notify::{NotificationEvent, Notifier, NotifierMux};
use regwatch::runner::run_once;
use regwatch::state::StateStore;

struct StubSource(HashMap<String, String>);

#[async_trait::async_trait]
impl PageSource for StubSource {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.0
            .get(url)
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}

#[derive(Clone, Default)]
struct Recording(Arc<Mutex<Vec<NotificationEvent>>>);

#[async_trait::async_trait]
impl Notifier for Recording {
    async fn send(&self, ev: &NotificationEvent) -> anyhow::Result<()> {
        self.0.lock().unwrap().push(ev.clone());
        Ok(())
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

const CONFIG: &str = r#"
    window_days = 365
    dedupe_days = 7
    pacing_secs = 0

    [[events]]
    name = "city-marathon"
    urls = ["https://example.org/reg"]
    keywords_any = ["register now"]
    keywords_block = ["closed"]
    locale = "en"
"#;

fn source() -> StubSource {
    let mut pages = HashMap::new();
    pages.insert(
        "https://example.org/reg".to_string(),
        "<html><body><p>Registration opens on January 10, 2026.</p></body></html>".to_string(),
    );
    StubSource(pages)
}

#[tokio::test]
async fn first_run_notifies_second_run_is_suppressed() {
    let cfg = MonitorConfig::from_toml_str(CONFIG).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 12, 20, 9, 0, 0).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    let recorder = Recording::default();
    let mut sinks = NotifierMux::new();
    sinks.push(Box::new(recorder.clone()));

    // First run: the explicit date is 21 days out, well inside the window.
    let mut state = StateStore::load(&state_path);
    let summary = run_once(&cfg, &source(), &sinks, &mut state, now).await;
    assert!(summary.triggered);
    assert_eq!(summary.new_alerts, 1);
    state.save_if_dirty(&state_path).unwrap();

    let sent = recorder.0.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "[ALERT] city-marathon — registration");
    assert!(sent[0].body.contains("10/01/2026"));
    assert!(sent[0].body.contains("21 days remaining"));
    assert!(sent[0].body.contains("Source: https://example.org/reg"));

    // Second run, one hour later, from the persisted snapshot: suppressed.
    let mut state = StateStore::load(&state_path);
    let later = now + chrono::Duration::hours(1);
    let summary = run_once(&cfg, &source(), &sinks, &mut state, later).await;
    assert!(!summary.triggered);
    assert_eq!(summary.new_alerts, 0);
    assert_eq!(recorder.0.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn changed_reason_notifies_again_within_dedupe_window() {
    let cfg = MonitorConfig::from_toml_str(CONFIG).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 12, 20, 9, 0, 0).unwrap();

    let recorder = Recording::default();
    let mut sinks = NotifierMux::new();
    sinks.push(Box::new(recorder.clone()));

    let mut state = StateStore::new();
    run_once(&cfg, &source(), &sinks, &mut state, now).await;

    // Same URL, next day: the page now carries a keyword instead of the
    // date. Different reason → different signature → not a duplicate.
    let mut pages = HashMap::new();
    pages.insert(
        "https://example.org/reg".to_string(),
        "<p>Register now — spots are limited!</p>".to_string(),
    );
    let later = now + chrono::Duration::days(1);
    let summary = run_once(&cfg, &StubSource(pages), &sinks, &mut state, later).await;
    assert!(summary.triggered);

    let sent = recorder.0.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].body.contains("register now"));
}

#[test]
fn finding_carries_the_opening_date() {
    use chrono::NaiveDate;
    use regwatch::dates::{DateCandidate, Locale};
    use regwatch::evaluate::{evaluate, Status};
    use regwatch::extract::visible_text;
    use regwatch::keywords::{classify, normalize};
    use regwatch::signals::extract_opening_date;

    let text = visible_text("<p>Registration opens on January 10, 2026.</p>");
    let hits = classify(&normalize(&text), &[], &[]);
    let opening = extract_opening_date(&text, Locale::En);
    let f = evaluate(
        "city-marathon",
        "https://example.org/reg",
        &hits,
        opening,
        365,
        NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
        Utc::now(),
    );
    assert_eq!(f.status, Status::Open);
    assert!(f.notify);
    assert_eq!(
        f.opening_date,
        Some(DateCandidate { day: 10, month: 1, year: 2026 })
    );
}

#[tokio::test]
async fn block_only_page_never_notifies() {
    let cfg = MonitorConfig::from_toml_str(CONFIG).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 12, 20, 9, 0, 0).unwrap();

    let mut pages = HashMap::new();
    pages.insert(
        "https://example.org/reg".to_string(),
        "<p>Registration is closed for this season.</p>".to_string(),
    );

    let recorder = Recording::default();
    let mut sinks = NotifierMux::new();
    sinks.push(Box::new(recorder.clone()));

    let mut state = StateStore::new();
    let summary = run_once(&cfg, &StubSource(pages), &sinks, &mut state, now).await;
    assert!(!summary.triggered);
    assert!(recorder.0.lock().unwrap().is_empty());
    assert!(!state.is_dirty());
}
