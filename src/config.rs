// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration file support for the bridge daemon.
//!
//! Settings are read once at startup from `hifi-bridge.toml`. Search order:
//! 1. Path given with `--config`
//! 2. `./hifi-bridge.toml`
//! 3. `~/.config/hifi-bridge/hifi-bridge.toml`
//! 4. `/etc/hifi-bridge/hifi-bridge.toml`
//!
//! Every key has a default, so a missing file or an empty one is valid.
//!
//! ```toml
//! [mqtt]
//! host = "broker.lan"
//! topic_prefix = "/hifi/"
//!
//! [device]
//! host = "192.168.1.20"
//! max_volume = 60
//!
//! [scheduler]
//! refresh_period = 10
//!
//! [logging]
//! file = "/var/log/hifi-bridge.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::protocol::{HttpConfig, MqttBroker, MqttBrokerBuilder};
use crate::scheduler::SchedulerConfig;

const CONFIG_FILE_NAME: &str = "hifi-bridge.toml";
const CONFIG_DIR_NAME: &str = "hifi-bridge";

/// Returns the default search paths for the configuration file.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from("/etc").join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    paths
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Message bus connection.
    pub mqtt: MqttSection,
    /// Receiver HTTP interface.
    pub device: DeviceSection,
    /// Tick timing.
    pub scheduler: SchedulerSection,
    /// Log output.
    pub logging: LoggingSection,
}

/// `[mqtt]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttSection {
    /// Broker host name or address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Client identifier presented to the broker.
    pub client_id: String,
    /// Prefix of every topic, including the trailing separator.
    pub topic_prefix: String,
    /// Publish attribute values as retained messages.
    pub retain: bool,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u64,
    /// Time allowed for the initial connection, in seconds.
    pub connection_timeout_secs: u64,
    /// Time allowed for a single publish, in seconds.
    pub publish_timeout_secs: u64,
    /// Pause before reconnecting after a connection error, in seconds.
    pub reconnect_delay_secs: u64,
}

impl Default for MqttSection {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "mqtt_hifi".to_string(),
            topic_prefix: "/hifi/".to_string(),
            retain: false,
            keep_alive_secs: 30,
            connection_timeout_secs: 10,
            publish_timeout_secs: 5,
            reconnect_delay_secs: 5,
        }
    }
}

impl MqttSection {
    /// Returns a broker builder carrying these settings.
    #[must_use]
    pub fn broker_builder(&self) -> MqttBrokerBuilder {
        MqttBroker::builder()
            .host(&self.host)
            .port(self.port)
            .client_id(&self.client_id)
            .topic_prefix(&self.topic_prefix)
            .retain(self.retain)
            .keep_alive(Duration::from_secs(self.keep_alive_secs))
            .connection_timeout(Duration::from_secs(self.connection_timeout_secs))
            .publish_timeout(Duration::from_secs(self.publish_timeout_secs))
            .reconnect_delay(Duration::from_secs(self.reconnect_delay_secs))
    }
}

/// `[device]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSection {
    /// Receiver host name or address, optionally with scheme and port.
    pub host: String,
    /// TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Response read timeout in milliseconds.
    pub read_timeout_ms: u64,
    /// Top of the receiver's native volume scale.
    pub max_volume: u8,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            connect_timeout_ms: 2000,
            read_timeout_ms: 6000,
            max_volume: 60,
        }
    }
}

impl DeviceSection {
    /// Returns the HTTP transport settings.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::new(&self.host)
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_read_timeout(Duration::from_millis(self.read_timeout_ms))
    }
}

/// `[scheduler]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    /// Tick period in milliseconds.
    pub tick_interval_ms: u64,
    /// Idle ticks between status refreshes.
    pub refresh_period: u32,
    /// Ticks skipped after a power-on command.
    pub power_on_cooldown_ticks: u32,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            refresh_period: 10,
            power_on_cooldown_ticks: 4,
        }
    }
}

impl SchedulerSection {
    /// Returns the scheduler timing.
    #[must_use]
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::new()
            .with_tick_interval(Duration::from_millis(self.tick_interval_ms))
            .with_refresh_period(self.refresh_period)
            .with_power_on_cooldown(self.power_on_cooldown_ticks)
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// File the log is appended to. Logs go to stdout when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Level filter (trace, debug, info, warn, error).
    pub level: String,
    /// Log at debug level and mirror output to stdout.
    pub debug: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
            debug: false,
        }
    }
}

impl BridgeConfig {
    /// Parses a configuration document and validates it.
    ///
    /// `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML or mistyped values and
    /// `ConfigError::Invalid` for values that fail validation.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(origin.to_path_buf(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read, otherwise
    /// whatever [`from_toml_str`](Self::from_toml_str) returns.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e.to_string()))?;
        Self::from_toml_str(&content, path)
    }

    /// Loads the explicit file if one is given, otherwise the first file
    /// found on the search path, otherwise the defaults.
    ///
    /// Returns the configuration and the file it came from.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the chosen file cannot be read or is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::load_from_file(path)?, Some(path.to_path_buf())));
        }

        for path in config_search_paths() {
            if path.exists() {
                return Ok((Self::load_from_file(&path)?, Some(path)));
            }
        }

        Ok((Self::default(), None))
    }

    /// Checks values that deserialize fine but cannot work.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.host.trim().is_empty() {
            return Err(invalid("mqtt.host", "must not be empty"));
        }
        if self.mqtt.topic_prefix.is_empty() {
            return Err(invalid("mqtt.topic_prefix", "must not be empty"));
        }
        if self.device.host.trim().is_empty() {
            return Err(invalid("device.host", "must not be empty"));
        }
        if self.device.max_volume == 0 {
            return Err(invalid("device.max_volume", "must be greater than zero"));
        }
        if self.scheduler.tick_interval_ms == 0 {
            return Err(invalid("scheduler.tick_interval_ms", "must be greater than zero"));
        }
        if self.scheduler.refresh_period == 0 {
            return Err(invalid("scheduler.refresh_period", "must be greater than zero"));
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(invalid(
                "logging.level",
                format!(
                    "{:?} is not one of trace, debug, info, warn, error",
                    self.logging.level
                ),
            ));
        }
        Ok(())
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<effective>"), e.to_string()))
    }
}

fn invalid(key: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        message: message.into(),
    }
}
