//! Configuration file support.
//!
//! Loads the kernel route layer configuration from TOML.
//! Default location: /etc/babeld/kernel.toml

use crate::error::ConfigError;
use crate::rib::{RouteSource, Safi, RTPROT_BABEL, RT_TABLE_MAIN};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/babeld/kernel.toml";

/// Identity and placement of installed routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Routing protocol tag stamped on every route
    #[serde(default = "default_protocol")]
    pub protocol: u8,

    /// Kernel routing table
    #[serde(default = "default_table")]
    pub table: u32,

    #[serde(default)]
    pub safi: Safi,
}

/// Logging output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    #[serde(default)]
    pub route: RouteConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_protocol() -> u8 {
    RTPROT_BABEL
}

fn default_table() -> u32 {
    RT_TABLE_MAIN
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            table: default_table(),
            safi: Safi::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl KernelConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => {
                let config: KernelConfig =
                    toml::from_str(&content).map_err(|e| ConfigError::Parse {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                config.validate()?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Load from default location or defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_or_default(DEFAULT_CONFIG_PATH)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            field: "config".to_string(),
            message: format!("failed to serialize: {}", e),
        })?;

        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.route.protocol == 0 {
            return Err(ConfigError::Invalid {
                field: "route.protocol".to_string(),
                message: "must be > 0".to_string(),
            });
        }

        if self.route.table == 0 {
            return Err(ConfigError::Invalid {
                field: "route.table".to_string(),
                message: "must be > 0".to_string(),
            });
        }

        Ok(())
    }

    /// The identity installers stamp on their requests.
    pub fn route_source(&self) -> RouteSource {
        RouteSource {
            protocol: self.route.protocol,
            table: self.route.table,
            safi: self.route.safi,
            flags: 0,
        }
    }
}
