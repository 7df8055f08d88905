use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::broker::{NodeList, Role};
use crate::utils::{Error, Result};

/// Top-level configuration settings for the application.
///
/// Includes the broker cluster coordinates and where the journal is written.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub rabbitmq: RabbitMqSettings,
    pub log: LogSettings,
}

/// Broker cluster coordinates.
///
/// `hosts` is the raw comma-separated `host:port` list; use [`Settings::nodes`]
/// to obtain the validated [`NodeList`].
#[derive(Deserialize, Clone)]
pub struct RabbitMqSettings {
    pub hosts: String,
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub dir: String,
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub rabbitmq: Option<PartialRabbitMqSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialRabbitMqSettings {
    pub hosts: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub dir: Option<String>,
    pub level: Option<String>,
}

/// Static username/password pair presented to every node.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Durations that pace the loops. Not read from the environment; tests
/// shrink them to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub publish_interval: Duration,
    pub processing_delay: Duration,
    pub backoff: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rabbitmq: RabbitMqSettings {
                hosts: crate::broker::node::DEFAULT_HOSTS.to_string(),
                user: "admin".to_string(),
                pass: "admin".to_string(),
            },
            log: LogSettings {
                dir: "/var/log".to_string(),
                level: "info".to_string(),
            },
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            read_timeout: Duration::from_secs(3),
            write_timeout: Duration::from_secs(3),
            publish_interval: Duration::from_secs(2),
            processing_delay: Duration::from_millis(500),
            backoff: Duration::from_secs(3),
        }
    }
}

impl Settings {
    /// Parses the configured host list. Fails before any connection is attempted.
    pub fn nodes(&self) -> Result<NodeList> {
        NodeList::parse(&self.rabbitmq.hosts)
    }

    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::new(&self.rabbitmq.user, &self.rabbitmq.pass)
    }

    /// Journal location for `role`, e.g. `/var/log/consumer/messages.log`.
    pub fn log_file(&self, role: Role) -> PathBuf {
        PathBuf::from(&self.log.dir)
            .join(role.to_string())
            .join("messages.log")
    }
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Result<Self> {
        if username.is_empty() {
            return Err(Error::Configuration("broker username is empty".to_string()));
        }
        if username.chars().chain(password.chars()).any(char::is_control) {
            return Err(Error::Configuration(
                "broker credentials contain control characters".to_string(),
            ));
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl std::fmt::Debug for RabbitMqSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RabbitMqSettings")
            .field("hosts", &self.hosts)
            .field("user", &self.user)
            .field("pass", &"***")
            .finish()
    }
}
