use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::health::DEFAULT_HEALTH_PATH;
use crate::sensor::{DEFAULT_THERMAL_ZONE, SensorBackend};

pub const DEFAULT_SLEEP_DURATION_SECS: u64 = 60;
pub const DEFAULT_NUM_SAMPLES: u32 = 3;
pub const DEFAULT_SAMPLE_INTERVAL_SECS: u64 = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub store: StoreConfig,
    pub sampling: SamplingConfig,
    pub health: HealthConfig,
    pub sensors: SensorConfig,
}

#[derive(Clone)]
pub struct StoreConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

// The URI may embed credentials; keep it out of logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("uri", &"<redacted>")
            .field("database", &self.database)
            .field("collection", &self.collection)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingConfig {
    /// Idle time between the end of one cycle and the start of the next.
    pub sleep_duration_secs: u64,
    /// Sub-samples averaged into each record (always >= 1).
    pub num_samples: u32,
    /// Delay between consecutive sub-samples.
    pub sample_interval_secs: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sleep_duration_secs: DEFAULT_SLEEP_DURATION_SECS,
            num_samples: DEFAULT_NUM_SAMPLES,
            sample_interval_secs: DEFAULT_SAMPLE_INTERVAL_SECS,
        }
    }
}

impl SamplingConfig {
    pub fn sleep_duration(&self) -> Duration {
        Duration::from_secs(self.sleep_duration_secs)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.sample_interval_secs)
    }
}

#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub status_path: PathBuf,
    /// Bind address for the HTTP health endpoint; disabled when unset.
    pub http_addr: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SensorConfig {
    pub backend: SensorBackend,
    pub thermal_path: PathBuf,
}

impl LoggerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (e.g. a map in tests). Required keys must be non-empty;
    /// numeric keys that are absent or not integers fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = StoreConfig {
            uri: required("MONGO_URI")?,
            database: required("MONGO_DATABASE")?,
            collection: required("MONGO_LOGGER_COLLECTION")?,
        };

        let sampling = SamplingConfig {
            sleep_duration_secs: parse_or(
                optional("SLEEP_DURATION_SECS"),
                DEFAULT_SLEEP_DURATION_SECS,
            ),
            num_samples: optional("NUM_SAMPLES")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|n| *n >= 1)
                .unwrap_or(DEFAULT_NUM_SAMPLES),
            sample_interval_secs: parse_or(
                optional("SAMPLE_INTERVAL_SECS"),
                DEFAULT_SAMPLE_INTERVAL_SECS,
            ),
        };

        let health = HealthConfig {
            status_path: optional("HEALTH_STATUS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HEALTH_PATH)),
            http_addr: optional("HEALTH_HTTP_ADDR"),
        };

        let sensors = SensorConfig {
            backend: optional("SENSOR_BACKEND")
                .and_then(|v| SensorBackend::parse(&v))
                .unwrap_or_default(),
            thermal_path: optional("THERMAL_ZONE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_THERMAL_ZONE)),
        };

        Ok(Self {
            store,
            sampling,
            health,
            sensors,
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
