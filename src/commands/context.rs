use crate::config::Config;
use crate::config::settings::expand_home;
use crate::notify::{ChannelKind, EmailChannel, HttpMailRelay, LogMailTransport, MailTransport, NotificationChannel, SendPool, SmsChannel};
use crate::storage::CareRepository;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Everything a command needs, resolved once from config and CLI overrides.
pub struct AppContext {
    pub config: Config,
    pub repository: CareRepository,
    pub channel: NotificationChannel,
    pub pool: SendPool,
}

impl AppContext {
    pub fn new(config: Config, data: Option<&str>, channel: Option<ChannelKind>) -> Result<Self> {
        let repository_path = repository_path(&config, data);
        let repository = CareRepository::open(&repository_path)
            .with_context(|| format!("Failed to load care repository from {}", repository_path.display()))?;

        let kind = channel.unwrap_or(config.dispatch.default_channel);
        let channel = build_channel(&config, kind)?;
        let pool = SendPool::new(
            config.dispatch.max_concurrent_sends,
            Duration::from_secs(config.dispatch.send_timeout_secs),
        );

        tracing::debug!(
            repository = %repository_path.display(),
            channel = %kind,
            max_concurrent = pool.max_concurrent(),
            "Context ready"
        );

        Ok(Self { config, repository, channel, pool })
    }
}

/// `--data` wins over the configured repository path.
pub fn repository_path(config: &Config, data: Option<&str>) -> PathBuf {
    match data {
        Some(path) => expand_home(path),
        None => config.repository_path(),
    }
}

pub fn build_channel(config: &Config, kind: ChannelKind) -> Result<NotificationChannel> {
    match kind {
        ChannelKind::Sms => Ok(NotificationChannel::Sms(SmsChannel)),
        ChannelKind::Email => {
            let transport: Arc<dyn MailTransport> = match config.email.transport.as_str() {
                "log" => Arc::new(LogMailTransport),
                _ => Arc::new(HttpMailRelay::new(&config.email.host, config.email.port, config.email.use_tls)?),
            };

            // Missing credentials are reported per send, not here.
            let email = EmailChannel::new(config.credentials(), transport).with_subject(config.email.subject.clone());
            Ok(NotificationChannel::Email(email))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_channel_kinds() {
        let mut config = Config::default();
        assert_eq!(build_channel(&config, ChannelKind::Sms).unwrap().kind(), ChannelKind::Sms);

        config.email.transport = "log".to_string();
        assert_eq!(build_channel(&config, ChannelKind::Email).unwrap().kind(), ChannelKind::Email);
    }

    #[test]
    fn test_data_flag_overrides_repository_path() {
        let config = Config::default();
        assert_eq!(repository_path(&config, Some("/tmp/care.json")), PathBuf::from("/tmp/care.json"));
        assert_eq!(repository_path(&config, None), config.repository_path());
    }
}
