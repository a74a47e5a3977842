use crate::notify::channel::NotificationChannel;
use crate::notify::error::NotificationError;
use crate::notify::service::NotificationService;
use crate::notify::{NotificationRequest, NotificationResult};
use futures::stream::{self, StreamExt};
use std::time::Duration;

/// Runs independent sends with bounded concurrency.
///
/// Results come back in submission order regardless of which send finishes
/// first, and each attempt gets its own timeout so a stalled transport only
/// costs the recipient it was talking to.
#[derive(Debug, Clone, Copy)]
pub struct SendPool {
    max_concurrent: usize,
    timeout: Duration,
}

impl Default for SendPool {
    fn default() -> Self {
        Self::new(4, Duration::from_secs(30))
    }
}

impl SendPool {
    pub fn new(max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            timeout,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn send_all(&self, channel: &NotificationChannel, requests: Vec<NotificationRequest>) -> Vec<NotificationResult> {
        stream::iter(requests)
            .map(|request| self.send_one(channel, request))
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    /// One attempt, at most once.
    pub async fn send_one(&self, channel: &NotificationChannel, request: NotificationRequest) -> NotificationResult {
        let service = NotificationService::new(channel.clone(), request.recipient.clone());

        let outcome = match tokio::time::timeout(self.timeout, service.send_alert(&request.body)).await {
            Ok(result) => result,
            Err(_) => Err(NotificationError::timeout(self.timeout.as_millis())),
        };

        match &outcome {
            Ok(()) => tracing::debug!(recipient = %request.recipient, channel = %request.channel, "Notification sent"),
            Err(e) => tracing::warn!(recipient = %request.recipient, channel = %request.channel, error = %e, "Notification failed"),
        }

        NotificationResult::from_outcome(request, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::channel::{ChannelKind, EmailChannel};
    use crate::notify::transport::{MailTransport, OutgoingMail, SmtpCredentials};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Sleeps longer for recipients that appear earlier, so completion order is reversed.
    struct StaggeredTransport;

    #[async_trait]
    impl MailTransport for StaggeredTransport {
        fn name(&self) -> &str {
            "staggered"
        }

        async fn deliver(&self, mail: &OutgoingMail, _credentials: &SmtpCredentials) -> anyhow::Result<()> {
            let delay = match mail.to.as_str() {
                "a@example.com" => 60,
                "b@example.com" => 30,
                "stall@example.com" => 10_000,
                _ => 0,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(())
        }
    }

    fn channel() -> NotificationChannel {
        let credentials = SmtpCredentials {
            username: "clinic@example.com".to_string(),
            password: "secret".to_string(),
        };
        NotificationChannel::Email(EmailChannel::new(Some(credentials), Arc::new(StaggeredTransport)))
    }

    fn request(recipient: &str) -> NotificationRequest {
        NotificationRequest::new(recipient, "body", ChannelKind::Email)
    }

    #[tokio::test]
    async fn test_results_keep_submission_order() {
        let pool = SendPool::new(3, Duration::from_secs(5));
        let results = pool
            .send_all(&channel(), vec![request("a@example.com"), request("b@example.com"), request("c@example.com")])
            .await;

        let recipients: Vec<&str> = results.iter().map(|r| r.recipient.as_str()).collect();
        assert_eq!(recipients, vec!["a@example.com", "b@example.com", "c@example.com"]);
        assert!(results.iter().all(|r| r.success));
    }

    #[tokio::test]
    async fn test_timeout_only_affects_stalled_send() {
        let pool = SendPool::new(2, Duration::from_millis(200));
        let results = pool
            .send_all(&channel(), vec![request("stall@example.com"), request("c@example.com")])
            .await;

        assert!(!results[0].success);
        assert!(results[0].error.as_ref().unwrap().is_timeout());
        assert!(results[1].success);
    }

    #[test]
    fn test_concurrency_floor() {
        assert_eq!(SendPool::new(0, Duration::from_secs(1)).max_concurrent(), 1);
    }
}
