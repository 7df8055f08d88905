mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{Credentials, LogSettings, RabbitMqSettings, Settings, Timings};

/// Loads the configuration from the default file and environment variables.
///
/// `RABBITMQ_HOSTS` maps to `rabbitmq.hosts`, `LOG_DIR` to `log.dir` and so on.
/// Values that are absent or empty fall back to `Settings::default()`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    let rabbitmq = partial.rabbitmq.as_ref();
    let log = partial.log.as_ref();

    Ok(Settings {
        rabbitmq: RabbitMqSettings {
            hosts: non_empty(rabbitmq.and_then(|r| r.hosts.clone()))
                .unwrap_or(default.rabbitmq.hosts),
            user: non_empty(rabbitmq.and_then(|r| r.user.clone()))
                .unwrap_or(default.rabbitmq.user),
            pass: non_empty(rabbitmq.and_then(|r| r.pass.clone()))
                .unwrap_or(default.rabbitmq.pass),
        },
        log: LogSettings {
            dir: non_empty(log.and_then(|l| l.dir.clone())).unwrap_or(default.log.dir),
            level: non_empty(log.and_then(|l| l.level.clone())).unwrap_or(default.log.level),
        },
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
