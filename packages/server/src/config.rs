use std::time::Duration;

use crate::domain::Language;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9999;
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_JANITOR_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub heartbeat_interval: Duration,
    pub default_language: Language,
    /// `None` disables the janitor
    pub feedback_ttl: Option<Duration>,
    pub janitor_interval: Duration,
}

impl ServerConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// A zero interval keeps the default
    #[must_use]
    pub const fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.heartbeat_interval = interval;
        }
        self
    }

    #[must_use]
    pub const fn with_default_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    /// A zero TTL disables purging
    #[must_use]
    pub const fn with_feedback_ttl(mut self, ttl: Duration) -> Self {
        self.feedback_ttl = if ttl.is_zero() { None } else { Some(ttl) };
        self
    }

    /// A zero interval keeps the default
    #[must_use]
    pub const fn with_janitor_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.janitor_interval = interval;
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_INTERVAL_SECS),
            default_language: Language::CN,
            feedback_ttl: None,
            janitor_interval: Duration::from_secs(DEFAULT_JANITOR_INTERVAL_SECS),
        }
    }
}
