use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use upsprims::export::{ExportError, InfluxConfig};
use upsprims::session::SessionConfig;
use upsprims::transport::{Endpoint, TransportError, DEFAULT_PORT};

pub const DEFAULT_TIMEOUT_SECS: f64 = 5.0;
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 15;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config lists no devices")]
    NoDevices,

    #[error("device {id:?}: {source}")]
    Host {
        id: String,
        source: TransportError,
    },

    #[error("device id {0:?} is listed more than once")]
    DuplicateId(String),

    #[error("device id must not be empty")]
    EmptyId,

    #[error("device {id:?}: {field} must be positive")]
    NotPositive { id: String, field: &'static str },

    #[error("device {id:?}: {field} is too large")]
    OutOfRange { id: String, field: &'static str },

    #[error("[influx] section: {0}")]
    Influx(#[from] ExportError),
}

/// One `[[device]]` entry as written in the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceEntry {
    pub id: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_scan_interval_secs() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

/// TOML device file: one or more UPSes plus optional influx export.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceFile {
    #[serde(default, rename = "device")]
    pub devices: Vec<DeviceEntry>,
    #[serde(default)]
    pub influx: Option<InfluxConfig>,
}

/// A validated device with its host normalised.
#[derive(Debug, Clone)]
pub struct Device {
    pub id: String,
    pub endpoint: Endpoint,
    pub timeout: Duration,
    pub scan_interval: Duration,
}

impl Device {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.endpoint.clone()).with_timeout(self.timeout)
    }
}

impl DeviceFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let file: DeviceFile = toml::from_str(text)?;
        file.resolve()?;
        if let Some(influx) = &file.influx {
            influx.validate()?;
        }
        Ok(file)
    }

    /// Validated devices, in file order.
    pub fn resolve(&self) -> Result<Vec<Device>, ConfigError> {
        if self.devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }

        let mut seen = HashSet::new();
        self.devices
            .iter()
            .map(|entry| {
                let id = entry.id.trim();
                if id.is_empty() {
                    return Err(ConfigError::EmptyId);
                }
                if !seen.insert(id.to_string()) {
                    return Err(ConfigError::DuplicateId(id.to_string()));
                }
                let not_positive = |field| ConfigError::NotPositive {
                    id: id.to_string(),
                    field,
                };
                if entry.timeout_secs.is_nan() || entry.timeout_secs <= 0.0 {
                    return Err(not_positive("timeout_secs"));
                }
                let timeout = Duration::try_from_secs_f64(entry.timeout_secs).map_err(|_| {
                    ConfigError::OutOfRange {
                        id: id.to_string(),
                        field: "timeout_secs",
                    }
                })?;
                if entry.scan_interval_secs == 0 {
                    return Err(not_positive("scan_interval_secs"));
                }
                let endpoint =
                    Endpoint::parse(&entry.host, entry.port).map_err(|source| ConfigError::Host {
                        id: id.to_string(),
                        source,
                    })?;
                Ok(Device {
                    id: id.to_string(),
                    endpoint,
                    timeout,
                    scan_interval: Duration::from_secs(entry.scan_interval_secs),
                })
            })
            .collect()
    }
}
