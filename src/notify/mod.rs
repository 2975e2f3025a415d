//! Notification sinks. Every sink is best-effort: a delivery failure is
//! logged and never propagates past the mux, and it does not roll back
//! the dedupe record written for the finding.

pub mod email;
pub mod webhook;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    pub event: String,
    pub url: String,
    pub title: String,
    pub body: String,
    pub ts: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(event: &str, url: &str, reason: &str, ts: DateTime<Utc>) -> Self {
        Self {
            event: event.to_string(),
            url: url.to_string(),
            title: format!("[ALERT] {} — registration", event),
            body: format!("{}\nSource: {}", reason, url),
            ts,
        }
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, ev: &NotificationEvent) -> anyhow::Result<()>;
    fn name(&self) -> &'static str;
}

/// Fan-out to every configured sink.
#[derive(Default)]
pub struct NotifierMux {
    sinks: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the mux from environment variables; sinks whose variables
    /// are absent are simply not registered.
    pub fn from_env() -> Self {
        let mut mux = Self::new();
        if let Some(w) = webhook::WebhookNotifier::from_env() {
            mux.push(Box::new(w));
        }
        match email::EmailSender::from_env() {
            Ok(Some(e)) => mux.push(Box::new(e)),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "email sink misconfigured, skipping"),
        }
        mux
    }

    pub fn push(&mut self, sink: Box<dyn Notifier>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub async fn send_all(&self, ev: &NotificationEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.send(ev).await {
                tracing::warn!(sink = sink.name(), error = %e, event = %ev.event, "notification failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Flaky;

    #[async_trait::async_trait]
    impl Notifier for Flaky {
        async fn send(&self, _ev: &NotificationEvent) -> anyhow::Result<()> {
            anyhow::bail!("down")
        }
        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    struct Recording(Arc<Mutex<Vec<String>>>);

    #[async_trait::async_trait]
    impl Notifier for Recording {
        async fn send(&self, ev: &NotificationEvent) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(ev.title.clone());
            Ok(())
        }
        fn name(&self) -> &'static str {
            "recording"
        }
    }

    #[tokio::test]
    async fn sink_failure_does_not_stop_the_fanout() {
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let mut mux = NotifierMux::new();
        mux.push(Box::new(Flaky));
        mux.push(Box::new(Recording(delivered.clone())));

        let ev =
            NotificationEvent::new("trail-run", "https://x.test", "Keywords found: go.", Utc::now());
        mux.send_all(&ev).await;
        assert_eq!(
            delivered.lock().unwrap().as_slice(),
            ["[ALERT] trail-run — registration"]
        );
    }

    #[test]
    fn event_body_includes_reason_and_source() {
        let ev = NotificationEvent::new("x", "https://x.test/p", "Reason.", Utc::now());
        assert_eq!(ev.body, "Reason.\nSource: https://x.test/p");
    }
}
