use crate::notify::{ChannelKind, SmtpCredentials};
use crate::reminders::FailurePolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const USERNAME_ENV: &str = "RPMON_SMTP_USERNAME";
pub const PASSWORD_ENV: &str = "RPMON_SMTP_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub email: EmailConfig,
    pub dispatch: DispatchConfig,
    pub reminders: ReminderConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub transport: String, // "relay" or "log"
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub subject: String,
}

// Hand-written so the password never reaches a log line.
impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("transport", &self.transport)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("subject", &self.subject)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub default_channel: ChannelKind,
    pub max_concurrent_sends: usize,
    pub send_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    pub failure_policy: String, // "isolate" or "abort"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub repository_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: EmailConfig {
                transport: "log".to_string(),
                host: "localhost".to_string(),
                port: 8025,
                use_tls: false,
                username: None,
                password: None,
                subject: crate::notify::channel::DEFAULT_SUBJECT.to_string(),
            },
            dispatch: DispatchConfig {
                default_channel: ChannelKind::Email,
                max_concurrent_sends: 4,
                send_timeout_secs: 30,
            },
            reminders: ReminderConfig {
                failure_policy: "isolate".to_string(),
            },
            data: DataConfig {
                repository_path: "~/.local/share/rpmon/care.json".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Config {
    /// Load from an explicit path, writing defaults there if nothing exists yet.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let contents = self.to_commented_toml()?;

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(".config").join("rpmon").join("config.toml"))
    }

    /// TOML with a short explanation above each section.
    pub fn to_commented_toml(&self) -> Result<String> {
        let mut output = String::new();

        output.push_str("# rpmon Configuration File\n");
        output.push_str("# Remote patient monitoring: vital-sign alerts and reminders\n\n");

        output.push_str("[email]\n");
        output.push_str("# \"log\" only writes mail to the log. \"relay\" POSTs it as JSON to an HTTP mail\n");
        output.push_str("# relay at host:port/send; this is not an SMTP server address.\n");
        output.push_str(&format!("transport = \"{}\"\n", self.email.transport));
        output.push_str(&format!("host = {}\n", toml_string(&self.email.host)));
        output.push_str(&format!("port = {}\n", self.email.port));
        output.push_str(&format!("use_tls = {}\n", self.email.use_tls));
        output.push_str("# Sender credentials. Prefer the RPMON_SMTP_USERNAME / RPMON_SMTP_PASSWORD\n");
        output.push_str("# environment variables over storing the password here.\n");
        match &self.email.username {
            Some(username) => output.push_str(&format!("username = {}\n", toml_string(username))),
            None => output.push_str("# username = \"clinic@example.com\"\n"),
        }
        match &self.email.password {
            Some(password) => output.push_str(&format!("password = {}\n", toml_string(password))),
            None => output.push_str("# password = \"app-specific-password\"\n"),
        }
        output.push_str(&format!("subject = {}\n\n", toml_string(&self.email.subject)));

        output.push_str("[dispatch]\n");
        output.push_str("# Channel used for alerts and reminders: \"email\" or \"sms\"\n");
        output.push_str(&format!("default_channel = \"{}\"\n", self.dispatch.default_channel));
        output.push_str("# Sends that may be in flight at once, and the per-send timeout\n");
        output.push_str(&format!("max_concurrent_sends = {}\n", self.dispatch.max_concurrent_sends));
        output.push_str(&format!("send_timeout_secs = {}\n\n", self.dispatch.send_timeout_secs));

        output.push_str("[reminders]\n");
        output.push_str("# \"isolate\": every reminder is attempted; \"abort\": stop at the first failure\n");
        output.push_str(&format!("failure_policy = \"{}\"\n\n", self.reminders.failure_policy));

        output.push_str("[data]\n");
        output.push_str("# JSON file holding users, care assignments, appointments and feedback\n");
        output.push_str(&format!("repository_path = {}\n\n", toml_string(&self.data.repository_path)));

        output.push_str("[logging]\n");
        output.push_str("# trace, debug, info, warn or error. RUST_LOG takes precedence.\n");
        output.push_str(&format!("level = \"{}\"\n", self.logging.level));

        Ok(output)
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "email.transport" => {
                if !["relay", "log"].contains(&value) {
                    anyhow::bail!("Invalid transport: {}. Must be 'relay' or 'log'", value);
                }
                self.email.transport = value.to_string();
            }
            "email.host" => self.email.host = value.to_string(),
            "email.port" => {
                self.email.port = value.parse()
                    .with_context(|| format!("Invalid port value: {}", value))?;
            }
            "email.use_tls" => {
                self.email.use_tls = value.parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            "email.username" => self.email.username = non_empty(value),
            "email.password" => self.email.password = non_empty(value),
            "email.subject" => self.email.subject = value.to_string(),
            "dispatch.default_channel" => {
                self.dispatch.default_channel = match value {
                    "email" => ChannelKind::Email,
                    "sms" => ChannelKind::Sms,
                    _ => anyhow::bail!("Invalid channel: {}. Must be 'email' or 'sms'", value),
                };
            }
            "dispatch.max_concurrent_sends" => {
                let sends: usize = value.parse()
                    .with_context(|| format!("Invalid concurrency value: {}", value))?;
                if sends == 0 {
                    anyhow::bail!("max_concurrent_sends must be at least 1");
                }
                self.dispatch.max_concurrent_sends = sends;
            }
            "dispatch.send_timeout_secs" => {
                let secs: u64 = value.parse()
                    .with_context(|| format!("Invalid timeout value: {}", value))?;
                if secs == 0 {
                    anyhow::bail!("send_timeout_secs must be at least 1");
                }
                self.dispatch.send_timeout_secs = secs;
            }
            "reminders.failure_policy" => {
                value.parse::<FailurePolicy>()?;
                self.reminders.failure_policy = value.to_string();
            }
            "data.repository_path" => self.data.repository_path = value.to_string(),
            "logging.level" => {
                if !["trace", "debug", "info", "warn", "error"].contains(&value) {
                    anyhow::bail!("Invalid log level: {}", value);
                }
                self.logging.level = value.to_string();
            }
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !["relay", "log"].contains(&self.email.transport.as_str()) {
            anyhow::bail!("Invalid email.transport: {}", self.email.transport);
        }
        if self.dispatch.max_concurrent_sends == 0 {
            anyhow::bail!("dispatch.max_concurrent_sends must be at least 1");
        }
        if self.dispatch.send_timeout_secs == 0 {
            anyhow::bail!("dispatch.send_timeout_secs must be at least 1");
        }
        self.reminders.failure_policy.parse::<FailurePolicy>()?;
        Ok(())
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.reminders.failure_policy.parse().unwrap_or_default()
    }

    /// Credentials from the environment, falling back to the config file.
    pub fn credentials(&self) -> Option<SmtpCredentials> {
        self.credentials_with(|name| std::env::var(name).ok())
    }

    pub fn credentials_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<SmtpCredentials> {
        let username = env(USERNAME_ENV).or_else(|| self.email.username.clone())?;
        let password = env(PASSWORD_ENV).or_else(|| self.email.password.clone())?;
        Some(SmtpCredentials { username, password })
    }

    pub fn repository_path(&self) -> PathBuf {
        expand_home(&self.data.repository_path)
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() { None } else { Some(value.to_string()) }
}

/// Quote and escape a value as a TOML basic string.
fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
