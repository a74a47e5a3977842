use serde::Serialize;
use thiserror::Error;

/// Why a single send attempt failed. Every variant is scoped to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationError {
    #[error("Invalid recipient for {channel}")]
    InvalidRecipient { channel: String },

    #[error("Channel not configured: {message}")]
    Config { message: String },

    #[error("Transport failure: {cause}")]
    Transport { cause: String, timed_out: bool },
}

impl NotificationError {
    pub fn transport(cause: impl Into<String>) -> Self {
        NotificationError::Transport {
            cause: cause.into(),
            timed_out: false,
        }
    }

    pub fn timeout(after_ms: u128) -> Self {
        NotificationError::Transport {
            cause: format!("send timed out after {} ms", after_ms),
            timed_out: true,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, NotificationError::Transport { timed_out: true, .. })
    }
}
