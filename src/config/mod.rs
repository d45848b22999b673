//! Configuration management for content-export
//!
//! This module handles loading, parsing, and managing configuration from various sources:
//! - Configuration files (TOML format)
//! - Environment variables
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::model::FileFormat;

/// Environment variable holding the environment identifier
pub const ENV_ENVIRONMENT_ID: &str = "CONTENT_EXPORT_ENVIRONMENT_ID";

/// Environment variable holding the Delivery API key
pub const ENV_API_KEY: &str = "CONTENT_EXPORT_API_KEY";

/// Environment variable overriding the output directory
pub const ENV_OUTPUT_DIR: &str = "CONTENT_EXPORT_OUTPUT_DIR";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Delivery API configuration
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Export behaviour
    #[serde(default)]
    pub export: ExportConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Delivery API connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Environment identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,

    /// Pre-seeded Delivery API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL for published content (secure access)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Base URL for preview content
    #[serde(default = "default_preview_base_url")]
    pub preview_base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Items requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Ask the API to wait for freshly published content
    #[serde(default = "default_wait_for_new_content")]
    pub wait_for_new_content: bool,
}

/// Export behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory the packaged file is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Format used when none is given on the command line
    #[serde(default)]
    pub default_format: Option<FileFormat>,

    /// Languages fetched concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Show a progress bar while exporting
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

/// Display and output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_base_url() -> String {
    "https://deliver.kontent.ai".to_string()
}

fn default_preview_base_url() -> String {
    "https://preview-deliver.kontent.ai".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    2000
}

fn default_wait_for_new_content() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_concurrency() -> usize {
    1
}

fn default_show_progress() -> bool {
    true
}

fn default_color_output() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            environment_id: None,
            api_key: None,
            base_url: default_base_url(),
            preview_base_url: default_preview_base_url(),
            timeout: default_timeout(),
            page_size: default_page_size(),
            wait_for_new_content: default_wait_for_new_content(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            default_format: None,
            concurrency: default_concurrency(),
            show_progress: default_show_progress(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color_output: default_color_output(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound(path.display().to_string())
            } else {
                ConfigError::Generic(format!("Failed to read {}: {}", path.display(), e))
            }
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Load configuration from an explicit path or the default location
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    ///
    /// # Arguments
    /// * `path` - Optional explicit config file path
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Variables are prefixed with CONTENT_EXPORT_.
    /// Example: CONTENT_EXPORT_API_KEY=ew0KICAi...
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(id) = non_empty(ENV_ENVIRONMENT_ID) {
            self.delivery.environment_id = Some(id);
        }
        if let Some(key) = non_empty(ENV_API_KEY) {
            self.delivery.api_key = Some(key);
        }
        if let Some(dir) = non_empty(ENV_OUTPUT_DIR) {
            self.export.output_dir = PathBuf::from(dir);
        }
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - Path to default configuration file
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".content-export")
            .join("config.toml")
    }

    /// Serialize the configuration to TOML with secrets masked
    pub fn to_display_toml(&self) -> Result<String> {
        let mut masked = self.clone();
        if let Some(key) = masked.delivery.api_key.as_mut() {
            *key = mask_secret(key);
        }
        toml::to_string_pretty(&masked)
            .map_err(|e| ConfigError::Generic(format!("Failed to serialize config: {e}")).into())
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &str, value: String| -> Result<()> {
            Err(ConfigError::InvalidValue {
                field: field.to_string(),
                value,
            }
            .into())
        };

        if self.delivery.timeout == 0 {
            return invalid("delivery.timeout", "0".to_string());
        }
        if self.delivery.page_size == 0 {
            return invalid("delivery.page_size", "0".to_string());
        }
        if self.export.concurrency == 0 {
            return invalid("export.concurrency", "0".to_string());
        }
        for (field, url) in [
            ("delivery.base_url", &self.delivery.base_url),
            ("delivery.preview_base_url", &self.delivery.preview_base_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return invalid(field, url.clone());
            }
        }

        Ok(())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery.timeout)
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}***")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.delivery.base_url, "https://deliver.kontent.ai");
        assert_eq!(config.export.concurrency, 1);
        assert!(config.display.color_output);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [delivery]
            environment_id = "975bf280-fd91-488c-994c-2f04416e5ee3"
            page_size = 500

            [export]
            default_format = "csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.delivery.page_size, 500);
        assert_eq!(config.delivery.timeout, 30);
        assert_eq!(config.export.default_format, Some(FileFormat::Csv));
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[delivery\n").unwrap_err();
        assert!(err.to_string().contains("Invalid config format"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load_from_file(Some(Path::new("/nonexistent/config.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_KEY, "secret-key"),
            (ENV_ENVIRONMENT_ID, "  "),
            (ENV_OUTPUT_DIR, "/tmp/exports"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.delivery.environment_id = Some("from-file".into());
        config.apply_env_from(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.delivery.api_key.as_deref(), Some("secret-key"));
        assert_eq!(config.delivery.environment_id.as_deref(), Some("from-file"));
        assert_eq!(config.export.output_dir, PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.export.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.delivery.base_url = "ftp://example.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_display_masks_api_key() {
        let mut config = Config::default();
        config.delivery.api_key = Some("abcdefgh".into());
        let rendered = config.to_display_toml().unwrap();
        assert!(rendered.contains("abcd***"));
        assert!(!rendered.contains("abcdefgh"));
    }
}
