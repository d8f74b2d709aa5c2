use std::time::Duration;

use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10; // watcher scan cadence
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5; // bounded wait for the watcher to exit
pub const DEFAULT_FIRED_CHANNEL_CAPACITY: usize = 256;

/// Env prefix for overrides. Nested keys are separated by a double underscore,
/// e.g. `SMARTREMINDER_SCHEDULER__POLL_INTERVAL_SECS=2`.
pub const ENV_PREFIX: &str = "SMARTREMINDER_";

/// Top-level config (smartreminder.toml + SMARTREMINDER_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmartReminderConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Trigger watcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between two scans of the reminder store.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// IANA zone used to interpret timestamps that carry no offset.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Upper bound on how long shutdown waits for the watcher to stop.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
    /// Buffer size of the fired-reminder delivery channel.
    #[serde(default = "default_fired_channel_capacity")]
    pub fired_channel_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            timezone: DEFAULT_TIMEZONE.to_string(),
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            fired_channel_capacity: DEFAULT_FIRED_CHANNEL_CAPACITY,
        }
    }
}

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Parse the configured reference zone.
    pub fn time_zone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| CoreError::UnknownTimeZone(self.timezone.clone()))
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}
fn default_shutdown_timeout_secs() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT_SECS
}
fn default_fired_channel_capacity() -> usize {
    DEFAULT_FIRED_CHANNEL_CAPACITY
}

impl SmartReminderConfig {
    /// Load config from a TOML file with SMARTREMINDER_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.smartreminder/smartreminder.toml
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: SmartReminderConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the watcher cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.poll_interval_secs == 0 {
            return Err(CoreError::Config(
                "scheduler.poll_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.scheduler.shutdown_timeout_secs == 0 {
            return Err(CoreError::Config(
                "scheduler.shutdown_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.scheduler.fired_channel_capacity == 0 {
            return Err(CoreError::Config(
                "scheduler.fired_channel_capacity must be at least 1".to_string(),
            ));
        }
        self.scheduler.time_zone()?;
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.smartreminder/smartreminder.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_match_constants() {
        let config = SmartReminderConfig::default();
        assert_eq!(config.gateway.port, DEFAULT_PORT);
        assert_eq!(config.scheduler.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.scheduler.time_zone().unwrap(), Tz::UTC);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_file_and_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "smartreminder.toml",
                r#"
                [gateway]
                port = 9100

                [scheduler]
                poll_interval_secs = 3
                timezone = "Europe/Berlin"
                "#,
            )?;
            jail.set_env("SMARTREMINDER_SCHEDULER__POLL_INTERVAL_SECS", "7");

            let config = SmartReminderConfig::load(Some("smartreminder.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.gateway.port, 9100);
            assert_eq!(config.gateway.bind, DEFAULT_BIND);
            assert_eq!(config.scheduler.poll_interval_secs, 7);
            assert_eq!(config.scheduler.time_zone().unwrap(), Tz::Europe__Berlin);
            Ok(())
        });
    }

    #[test]
    fn missing_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config = SmartReminderConfig::load(Some("nope.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.scheduler.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
            Ok(())
        });
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = SmartReminderConfig::default();
        config.scheduler.poll_interval_secs = 0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn zero_shutdown_timeout_is_rejected() {
        let mut config = SmartReminderConfig::default();
        config.scheduler.shutdown_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let mut config = SmartReminderConfig::default();
        config.scheduler.timezone = "Mars/Olympus".to_string();
        assert!(matches!(
            config.validate(),
            Err(CoreError::UnknownTimeZone(_))
        ));
    }
}
