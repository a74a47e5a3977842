pub mod channel;
pub mod error;
pub mod pool;
pub mod service;
pub mod transport;

pub use channel::{ChannelKind, EmailChannel, NotificationChannel, SmsChannel};
pub use error::NotificationError;
pub use pool::SendPool;
pub use service::NotificationService;
pub use transport::{HttpMailRelay, LogMailTransport, MailTransport, OutgoingMail, SmtpCredentials};

use serde::Serialize;

/// One intended send: who, what, and over which channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    pub recipient: String,
    pub body: String,
    pub channel: ChannelKind,
}

impl NotificationRequest {
    pub fn new(recipient: impl Into<String>, body: impl Into<String>, channel: ChannelKind) -> Self {
        Self {
            recipient: recipient.into(),
            body: body.into(),
            channel,
        }
    }
}

/// Outcome of exactly one send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationResult {
    pub recipient: String,
    pub channel: ChannelKind,
    pub success: bool,
    pub error: Option<NotificationError>,
}

impl NotificationResult {
    pub fn from_outcome(request: NotificationRequest, outcome: Result<(), NotificationError>) -> Self {
        Self {
            recipient: request.recipient,
            channel: request.channel,
            success: outcome.is_ok(),
            error: outcome.err(),
        }
    }
}
