//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `homehub.toml` in the working directory, or at the path given
//! by `HOMEHUB_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use homehub_app::automation_engine::DEFAULT_MAX_CASCADE_DEPTH;
use homehub_app::router::{DEFAULT_ENVIRONMENT_BOOLEAN, RouterSettings};
use homehub_domain::automation::Subscription;
use homehub_domain::config::{AdapterConfig, BooleanConfig, DeviceGroupConfig, Topology};
use homehub_domain::device::DeviceConfig;
use homehub_domain::location::Location;

const DEFAULT_CONFIG_PATH: &str = "homehub.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Router and persistence settings.
    pub hub: HubConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    pub adapter: Vec<AdapterConfig>,
    pub device: Vec<DeviceConfig>,
    pub devicegroup: Vec<DeviceGroupConfig>,
    pub boolean: Vec<BooleanConfig>,
    pub subscribe: Vec<Subscription>,
}

/// `[hub]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Where device snapshots are persisted.
    pub statefile: PathBuf,
    /// Seconds between two periodic ticks.
    pub tick_interval_secs: u64,
    pub latitude: f64,
    pub longitude: f64,
    /// Boolean refreshed from the daylight calculation on every tick.
    pub environment_boolean: String,
    /// Deepest allowed chain of boolean change cascades.
    pub max_cascade_depth: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `homehub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// setting is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("HOMEHUB_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("HOMEHUB_STATEFILE") {
            self.hub.statefile = PathBuf::from(val);
        }
        if let Some(val) = var("HOMEHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.hub.tick_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "tick_interval_secs must be non-zero".to_string(),
            ));
        }
        if !self.location().is_valid() {
            return Err(ConfigError::Validation(format!(
                "coordinates out of range: {}, {}",
                self.hub.latitude, self.hub.longitude
            )));
        }
        if self.hub.max_cascade_depth == 0 {
            return Err(ConfigError::Validation(
                "max_cascade_depth must be non-zero".to_string(),
            ));
        }
        if self.hub.environment_boolean.is_empty() {
            return Err(ConfigError::Validation(
                "environment_boolean must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn location(&self) -> Location {
        Location {
            latitude: self.hub.latitude,
            longitude: self.hub.longitude,
        }
    }

    /// Settings handed to the router.
    #[must_use]
    pub fn router_settings(&self) -> RouterSettings {
        RouterSettings {
            tick_interval: Duration::from_secs(self.hub.tick_interval_secs),
            location: self.location(),
            environment_boolean: self.hub.environment_boolean.clone(),
            max_cascade_depth: self.hub.max_cascade_depth,
        }
    }

    /// Adapters, devices, groups, booleans and subscriptions.
    #[must_use]
    pub fn topology(&self) -> Topology {
        Topology {
            adapters: self.adapter.clone(),
            devices: self.device.clone(),
            device_groups: self.devicegroup.clone(),
            booleans: self.boolean.clone(),
            subscriptions: self.subscribe.clone(),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        let location = Location::default();
        Self {
            statefile: PathBuf::from("state-snapshot.json"),
            tick_interval_secs: 60,
            latitude: location.latitude,
            longitude: location.longitude,
            environment_boolean: DEFAULT_ENVIRONMENT_BOOLEAN.to_string(),
            max_cascade_depth: DEFAULT_MAX_CASCADE_DEPTH,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homehubd=info,homehub_app=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
