use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Sender credentials, supplied once at process setup.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// The boundary to whatever actually moves mail.
#[async_trait]
pub trait MailTransport: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, mail: &OutgoingMail, credentials: &SmtpCredentials) -> Result<()>;
}

/// Hands mail to an HTTP relay listening on the configured host and port.
pub struct HttpMailRelay {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMailRelay {
    pub fn new(host: &str, port: u16, use_tls: bool) -> Result<Self> {
        let scheme = if use_tls { "https" } else { "http" };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client for mail relay")?;

        Ok(Self {
            client,
            endpoint: format!("{}://{}:{}/send", scheme, host, port),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MailTransport for HttpMailRelay {
    fn name(&self) -> &str {
        "relay"
    }

    async fn deliver(&self, mail: &OutgoingMail, credentials: &SmtpCredentials) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .json(mail)
            .send()
            .await
            .with_context(|| format!("Failed to reach mail relay at {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection(status, response.text().await.ok()));
        }

        Ok(())
    }
}

fn rejection(status: reqwest::StatusCode, body: Option<String>) -> anyhow::Error {
    let body = body.map(|b| b.trim().to_string()).unwrap_or_else(|| "<unreadable body>".to_string());
    anyhow::anyhow!("Mail relay rejected message ({}): {}", status, body)
}

/// Dry-run transport: records the delivery in the log and succeeds.
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, mail: &OutgoingMail, _credentials: &SmtpCredentials) -> Result<()> {
        tracing::info!(to = %mail.to, "Email delivered (log transport)");
        tracing::debug!(from = %mail.from, subject = %mail.subject, body = %mail.body, "Logged email content");
        Ok(())
    }
}
