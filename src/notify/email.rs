use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{NotificationEvent, Notifier};

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    /// Build the SMTP sink from environment. Returns `Ok(None)` when the
    /// sink is not configured (no host or no recipient); errors only on a
    /// present-but-invalid configuration.
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(host) = std::env::var("SMTP_HOST") else {
            return Ok(None);
        };
        let Ok(to_addr) = std::env::var("ALERT_EMAIL_TO") else {
            return Ok(None);
        };
        if host.trim().is_empty() || to_addr.trim().is_empty() {
            return Ok(None);
        }

        let port: u16 = std::env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .context("invalid SMTP_PORT")?;
        let user = std::env::var("SMTP_USER").ok();
        let pass = std::env::var("SMTP_PASS").ok();
        let from_addr = std::env::var("SMTP_FROM")
            .ok()
            .or_else(|| user.clone())
            .unwrap_or_else(|| "regwatch@localhost".to_string());

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .context("invalid SMTP_HOST")?
            .port(port);
        if let (Some(u), Some(p)) = (user, pass) {
            builder = builder.credentials(Credentials::new(u, p));
        }
        let mailer = builder.build();

        let from = from_addr.parse().context("invalid SMTP_FROM")?;
        let to = to_addr.parse().context("invalid ALERT_EMAIL_TO")?;

        Ok(Some(Self { mailer, from, to }))
    }
}

#[async_trait::async_trait]
impl Notifier for EmailSender {
    async fn send(&self, ev: &NotificationEvent) -> Result<()> {
        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(ev.title.clone())
            .header(header::ContentType::TEXT_PLAIN)
            .body(format!("{}\nDetected at: {}\n", ev.body, ev.ts.to_rfc3339()))
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
