use crate::notify::error::NotificationError;
use crate::notify::transport::{MailTransport, OutgoingMail, SmtpCredentials};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_SUBJECT: &str = "RPMS Notification";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Email,
    Sms,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Email => f.write_str("email"),
            ChannelKind::Sms => f.write_str("sms"),
        }
    }
}

/// A named transport capability. Cloning is cheap; the transport is shared.
#[derive(Clone)]
pub enum NotificationChannel {
    Email(EmailChannel),
    Sms(SmsChannel),
}

impl NotificationChannel {
    pub fn kind(&self) -> ChannelKind {
        match self {
            NotificationChannel::Email(_) => ChannelKind::Email,
            NotificationChannel::Sms(_) => ChannelKind::Sms,
        }
    }

    pub async fn send(&self, message: &str, recipient: &str) -> Result<(), NotificationError> {
        if recipient.trim().is_empty() {
            return Err(NotificationError::InvalidRecipient {
                channel: self.kind().to_string(),
            });
        }

        match self {
            NotificationChannel::Email(email) => email.send(message, recipient).await,
            NotificationChannel::Sms(sms) => sms.send(message, recipient),
        }
    }
}

impl fmt::Debug for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationChannel::Email(email) => f
                .debug_struct("Email")
                .field("transport", &email.transport.name())
                .field("credentials", &email.credentials)
                .finish(),
            NotificationChannel::Sms(_) => f.write_str("Sms"),
        }
    }
}

#[derive(Clone)]
pub struct EmailChannel {
    credentials: Option<SmtpCredentials>,
    subject: String,
    transport: Arc<dyn MailTransport>,
}

impl EmailChannel {
    pub fn new(credentials: Option<SmtpCredentials>, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            credentials,
            subject: DEFAULT_SUBJECT.to_string(),
            transport,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    async fn send(&self, message: &str, recipient: &str) -> Result<(), NotificationError> {
        let credentials = self
            .credentials
            .as_ref()
            .filter(|c| !c.username.is_empty() && !c.password.is_empty())
            .ok_or_else(|| NotificationError::Config {
                message: "SMTP username or password not provided".to_string(),
            })?;

        let mail = OutgoingMail {
            from: credentials.username.clone(),
            to: recipient.to_string(),
            subject: self.subject.clone(),
            body: message.to_string(),
        };

        self.transport
            .deliver(&mail, credentials)
            .await
            .map_err(|e| NotificationError::transport(format!("Error sending email: {:#}", e)))?;

        tracing::info!(recipient, transport = self.transport.name(), "Email sent");
        Ok(())
    }
}

/// SMS has no gateway wired in; a valid recipient is always accepted.
#[derive(Debug, Clone, Default)]
pub struct SmsChannel;

impl SmsChannel {
    fn send(&self, message: &str, recipient: &str) -> Result<(), NotificationError> {
        tracing::info!(recipient, "SMS sent");
        tracing::debug!(recipient, body = message, "SMS content");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::transport::LogMailTransport;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<OutgoingMail>>,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        fn name(&self) -> &str {
            "recording"
        }

        async fn deliver(&self, mail: &OutgoingMail, _credentials: &SmtpCredentials) -> Result<()> {
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    struct RefusingTransport;

    #[async_trait]
    impl MailTransport for RefusingTransport {
        fn name(&self) -> &str {
            "refusing"
        }

        async fn deliver(&self, _mail: &OutgoingMail, _credentials: &SmtpCredentials) -> Result<()> {
            anyhow::bail!("535 authentication failed")
        }
    }

    fn credentials() -> Option<SmtpCredentials> {
        Some(SmtpCredentials {
            username: "clinic@example.com".to_string(),
            password: "app-password".to_string(),
        })
    }

    #[tokio::test]
    async fn test_email_send_reaches_transport() {
        let transport = Arc::new(RecordingTransport::default());
        let channel = NotificationChannel::Email(EmailChannel::new(credentials(), transport.clone()));

        channel.send("Check vitals", "dr@example.com").await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "clinic@example.com");
        assert_eq!(sent[0].to, "dr@example.com");
        assert_eq!(sent[0].subject, DEFAULT_SUBJECT);
        assert_eq!(sent[0].body, "Check vitals");
    }

    #[tokio::test]
    async fn test_empty_recipient_rejected_before_transport() {
        let transport = Arc::new(RecordingTransport::default());
        let channel = NotificationChannel::Email(EmailChannel::new(credentials(), transport.clone()));

        let err = channel.send("msg", "  ").await.unwrap_err();
        assert_eq!(err, NotificationError::InvalidRecipient { channel: "email".to_string() });
        assert!(transport.sent.lock().unwrap().is_empty());

        let err = NotificationChannel::Sms(SmsChannel).send("msg", "").await.unwrap_err();
        assert_eq!(err, NotificationError::InvalidRecipient { channel: "sms".to_string() });
    }

    #[tokio::test]
    async fn test_missing_credentials_is_config_error() {
        let transport = Arc::new(RecordingTransport::default());
        let channel = NotificationChannel::Email(EmailChannel::new(None, transport.clone()));

        let err = channel.send("msg", "dr@example.com").await.unwrap_err();
        assert!(matches!(err, NotificationError::Config { .. }));
        assert!(transport.sent.lock().unwrap().is_empty());

        let blank = Some(SmtpCredentials { username: "clinic@example.com".to_string(), password: String::new() });
        let channel = NotificationChannel::Email(EmailChannel::new(blank, transport.clone()));
        assert!(matches!(
            channel.send("msg", "dr@example.com").await,
            Err(NotificationError::Config { .. })
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_wrapped() {
        let channel = NotificationChannel::Email(EmailChannel::new(credentials(), Arc::new(RefusingTransport)));

        let err = channel.send("msg", "dr@example.com").await.unwrap_err();
        match err {
            NotificationError::Transport { cause, timed_out } => {
                assert!(cause.contains("535 authentication failed"));
                assert!(!timed_out);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test]
    async fn test_info_logs_omit_message_body() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let body = "Alert! Patient P1's vital signs are abnormal: HR=130";
        NotificationChannel::Sms(SmsChannel).send(body, "+15550100").await.unwrap();
        let email = NotificationChannel::Email(EmailChannel::new(credentials(), Arc::new(LogMailTransport)));
        email.send(body, "dr@example.com").await.unwrap();

        let output = log.contents();
        assert!(output.contains("+15550100"));
        assert!(output.contains("dr@example.com"));
        assert!(!output.contains("HR=130"));
    }

    #[tokio::test]
    async fn test_sms_always_succeeds_for_valid_recipient() {
        let channel = NotificationChannel::Sms(SmsChannel);
        assert_eq!(channel.kind(), ChannelKind::Sms);
        assert!(channel.send("msg", "+15550100").await.is_ok());
    }
}
