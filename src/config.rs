//! Bridge configuration
//!
//! Configuration is merged from three layers: serde defaults, an optional
//! YAML file, and `EMSBRIDGE_`-prefixed environment variables. Command line
//! flags are applied on top by `main`.

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::{BridgeError, Result};

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// TCP port for the operator command interface; 0 disables it
    #[serde(default = "default_command_port")]
    pub command_port: u16,

    /// How to reach the EMS bus adapter
    #[serde(default)]
    pub bus: BusTarget,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Bus adapter endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum BusTarget {
    /// TCP tunnel to a remote bus adapter
    Tcp { host: String, port: u16 },
    /// Local serial adapter
    Serial {
        device: String,
        #[serde(default = "default_baud_rate")]
        baud: u32,
    },
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file; daily rotation, console output stays on
    #[serde(default)]
    pub file: Option<String>,
}

fn default_command_port() -> u16 {
    7777
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command_port: default_command_port(),
            bus: BusTarget::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for BusTarget {
    fn default() -> Self {
        BusTarget::Serial {
            device: "/dev/ttyUSB0".to_string(),
            baud: default_baud_rate(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl BridgeConfig {
    /// Load configuration, optionally merging a YAML file
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(BridgeConfig::default()));
        if let Some(path) = file {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed("EMSBRIDGE_").split("__"))
            .extract()
            .map_err(|e| BridgeError::ConfigError(format!("Failed to load configuration: {}", e)))
    }
}
