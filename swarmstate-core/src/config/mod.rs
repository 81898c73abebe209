//! Configuration management for the swarmstate engine
//!
//! Defaults, environment overrides, TOML files and validation for the
//! compression policy, decompression limits and logging setup.

use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

mod error;

pub use error::ConfigError;

/// Main engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Compression of dumps and push payloads
    pub compression: CompressionConfig,

    /// Decompression bounds
    pub limits: LimitsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Compression configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Compress payloads at all
    pub enabled: bool,

    /// Deflate level, 0..=9
    pub level: u32,

    /// Payloads smaller than this are never compressed
    pub threshold_bytes: usize,
}

/// Decompression limits (0 = unbounded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Upper bound on an incoming message payload after decompression
    pub max_message_size: usize,

    /// Upper bound on a single-namespace dump after decompression
    pub max_dump_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include timestamps
    pub with_timestamp: bool,

    /// Include target module
    pub with_target: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: 6,
            threshold_bytes: 1024,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_message_size: 1024 * 1024,   // 1 MB
            max_dump_size: 16 * 1024 * 1024, // 16 MB
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamp: true,
            with_target: true,
        }
    }
}

fn env_parse<T>(var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| ConfigError::Env {
            var: var.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(None),
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: SWARMSTATE_<SECTION>_<KEY>
    /// Example: SWARMSTATE_COMPRESSION_LEVEL=9
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Compression config
        if let Some(enabled) = env_parse("SWARMSTATE_COMPRESSION_ENABLED")? {
            config.compression.enabled = enabled;
        }
        if let Some(level) = env_parse("SWARMSTATE_COMPRESSION_LEVEL")? {
            config.compression.level = level;
        }
        if let Some(threshold) = env_parse("SWARMSTATE_COMPRESSION_THRESHOLD_BYTES")? {
            config.compression.threshold_bytes = threshold;
        }

        // Limits config
        if let Some(max) = env_parse("SWARMSTATE_LIMITS_MAX_MESSAGE_SIZE")? {
            config.limits.max_message_size = max;
        }
        if let Some(max) = env_parse("SWARMSTATE_LIMITS_MAX_DUMP_SIZE")? {
            config.limits.max_dump_size = max;
        }

        // Logging config
        if let Ok(level) = env::var("SWARMSTATE_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(json) = env_parse("SWARMSTATE_LOG_JSON")? {
            config.logging.json_format = json;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

        let config: Self = toml::from_str(&contents)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compression.level > 9 {
            return Err(ConfigError::Invalid(format!(
                "compression level must be in 0..=9, got {}",
                self.compression.level
            )));
        }

        self.logging
            .level
            .parse::<LogLevel>()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|source| ConfigError::Write { path: path.to_path_buf(), source })
    }
}
