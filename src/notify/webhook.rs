use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{NotificationEvent, Notifier};

pub const ENV_WEBHOOK_URL: &str = "ALERT_WEBHOOK_URL";

/// Generic JSON webhook sink; the payload shape is intentionally plain
/// (title/summary/body/link) so Teams/Slack-style receivers can adapt it.
#[derive(Clone)]
pub struct WebhookNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub title: &'a str,
    pub summary: &'a str,
    pub body: &'a str,
    pub link: &'a str,
}

impl WebhookNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
        }
    }

    pub fn from_env() -> Option<Self> {
        let url = std::env::var(ENV_WEBHOOK_URL).ok()?;
        if url.trim().is_empty() {
            return None;
        }
        Some(Self::new(url))
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    fn payload<'a>(ev: &'a NotificationEvent) -> WebhookPayload<'a> {
        WebhookPayload {
            title: &ev.title,
            summary: &ev.title,
            body: &ev.body,
            link: &ev.url,
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, ev: &NotificationEvent) -> Result<()> {
        let payload = Self::payload(ev);

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    if let Err(e) = rsp.error_for_status_ref() {
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1)))
                                .await;
                            continue;
                        }
                        return Err(anyhow!("webhook HTTP error: {e}"));
                    }
                    return Ok(());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
                        continue;
                    }
                    return Err(anyhow!("webhook request failed: {e}"));
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn payload_carries_title_summary_body_link() {
        let ev = NotificationEvent::new(
            "city-marathon",
            "https://example.org/reg",
            "Keywords found: register now.",
            Utc::now(),
        );
        let v = serde_json::to_value(WebhookNotifier::payload(&ev)).unwrap();
        assert_eq!(v["title"], "[ALERT] city-marathon — registration");
        assert_eq!(v["summary"], v["title"]);
        assert_eq!(v["link"], "https://example.org/reg");
        assert!(v["body"].as_str().unwrap().contains("register now"));
    }
}
