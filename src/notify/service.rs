use crate::notify::channel::NotificationChannel;
use crate::notify::error::NotificationError;

/// Binds one channel to one recipient. Forwards sends unchanged; no retries.
#[derive(Debug, Clone)]
pub struct NotificationService {
    channel: NotificationChannel,
    recipient: String,
}

impl NotificationService {
    pub fn new(channel: NotificationChannel, recipient: impl Into<String>) -> Self {
        Self {
            channel,
            recipient: recipient.into(),
        }
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn channel(&self) -> &NotificationChannel {
        &self.channel
    }

    pub async fn send_alert(&self, message: &str) -> Result<(), NotificationError> {
        self.channel.send(message, &self.recipient).await
    }
}
