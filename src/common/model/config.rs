use super::offload_config::OffloadConfig;
use crate::errors::{ConfigError, Error, Result};
use crate::utils::logger::LoggerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Offload settings as written in the config file.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OffloadSettings {
    /// Bucket receiving offloaded payloads; offloading is off without it
    pub bucket: Option<String>,
    /// Size in bytes above which a message is offloaded (default: 262144)
    pub size_threshold: Option<i64>,
    /// Offload every message regardless of size (default: false)
    pub always_offload: Option<bool>,
    /// Emit the legacy pointer tag and size attribute (default: false)
    pub use_legacy_pointer_format: Option<bool>,
}

impl OffloadSettings {
    /// Applies the settings through the validating setters.
    ///
    /// The bucket goes first so that `always_offload = true` can be checked
    /// against it.
    pub fn to_offload_config(&self) -> Result<OffloadConfig> {
        let mut config = OffloadConfig::new();
        if let Some(bucket) = &self.bucket {
            config.set_bucket(bucket.as_str())?;
        }
        if let Some(threshold) = self.size_threshold {
            let threshold = usize::try_from(threshold).map_err(|_| {
                Error::invalid_configuration(format!(
                    "size_threshold must not be negative, got {threshold}"
                ))
            })?;
            config.set_size_threshold(threshold)?;
        }
        if let Some(always_offload) = self.always_offload {
            config.set_always_offload(always_offload)?;
        }
        if let Some(use_legacy) = self.use_legacy_pointer_format {
            config.set_use_legacy_pointer_format(use_legacy);
        }
        Ok(config)
    }
}

/// Blob Storage Configuration
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct BlobStorageSettings {
    /// Local file system root for offloaded payloads; in-memory when absent
    pub path: Option<String>,
}

/// Logger Configuration
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoggerSettings {
    /// Log level filter, e.g. "info" or "info,payload_offload=debug"
    pub level: String,
    /// Rolling log file prefix
    pub file_path: Option<String>,
    /// Log to the console (default: true)
    pub console: Option<bool>,
    /// JSON formatted output (default: false)
    pub json: Option<bool>,
}

impl LoggerSettings {
    pub fn to_logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            level: self.level.clone(),
            file_path: self.file_path.as_ref().map(PathBuf::from),
            enable_console: self.console.unwrap_or(true),
            json_format: self.json.unwrap_or(false),
        }
    }
}

/// Main Configuration
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    /// Client instance name, used in log output
    pub name: String,
    #[serde(default)]
    pub offload: OffloadSettings,
    pub blob_storage: Option<BlobStorageSettings>,
    pub logger: Option<LoggerSettings>,
}

impl Config {
    /// Loads configuration from a TOML file
    pub fn load(path: &str) -> Result<Self> {
        let config_str =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Load(Box::new(e)))?;
        Self::parse(&config_str)
    }

    pub fn parse(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        Ok(config)
    }
}
