//! Configuration support for brainscan.
//!
//! The defaults match the Flask backend the pages are served by. A deployment
//! behind a different prefix can override them by storing an [`AppConfig`] as
//! JSON in localStorage under [`AppConfig::STORAGE_KEY`].

use brainscan_dom::Window;
use serde::{Deserialize, Serialize};

use crate::constants;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Backend endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Multipart image upload returning class probabilities
    #[serde(default = "default_predict_endpoint")]
    pub predict: String,

    /// Wipes the server-side prediction history
    #[serde(default = "default_clear_history_endpoint")]
    pub clear_history: String,
}

fn default_predict_endpoint() -> String {
    constants::DEFAULT_PREDICT_ENDPOINT.to_string()
}

fn default_clear_history_endpoint() -> String {
    constants::DEFAULT_CLEAR_HISTORY_ENDPOINT.to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            predict: default_predict_endpoint(),
            clear_history: default_clear_history_endpoint(),
        }
    }
}

/// Front-end configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default)]
    pub endpoints: Endpoints,

    /// LocalStorage key of the persisted theme
    #[serde(default = "default_theme_storage_key")]
    pub theme_storage_key: String,

    /// Predicted class that is shown with the positive icon
    #[serde(default = "default_healthy_class")]
    pub healthy_class: String,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_app_name() -> String {
    "brainscan".to_string()
}

fn default_theme_storage_key() -> String {
    constants::THEME_STORAGE_KEY.to_string()
}

fn default_healthy_class() -> String {
    constants::HEALTHY_CLASS.to_string()
}

impl AppConfig {
    /// LocalStorage key holding a JSON override.
    pub const STORAGE_KEY: &'static str = "brainscan-config";

    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            endpoints: Endpoints::default(),
            theme_storage_key: default_theme_storage_key(),
            healthy_class: default_healthy_class(),
            log_level: LogLevel::default(),
        }
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Try to load configuration from local storage.
    /// Returns None if not found or can't be parsed.
    pub fn load_from_storage(window: &dyn Window) -> Option<Self> {
        match window.storage_get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from localStorage");
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config from localStorage: {}", e);
                    None
                }
            },
            Ok(None) => {
                log::debug!("No config found in localStorage");
                None
            }
            Err(e) => {
                log::warn!("Failed to read from localStorage: {}", e);
                None
            }
        }
    }

    /// Stored configuration, or the defaults.
    pub fn load_or_default(window: &dyn Window) -> Self {
        Self::load_from_storage(window).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use brainscan_dom::headless::HeadlessWindow;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = AppConfig::from_json(r#"{"version": 1}"#).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.endpoints.predict, "/api/predict");
        assert_eq!(config.endpoints.clear_history, "/api/clear-history");
        assert_eq!(config.theme_storage_key, "theme");
        assert_eq!(config.healthy_class, "No Tumor");
    }

    #[test]
    fn test_partial_endpoint_override() {
        let config = AppConfig::from_json(
            r#"{"version": 1, "endpoints": {"predict": "/v2/predict"}, "log_level": "debug"}"#,
        )
        .unwrap();
        assert_eq!(config.endpoints.predict, "/v2/predict");
        assert_eq!(config.endpoints.clear_history, "/api/clear-history");
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = AppConfig::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                supported_version: CONFIG_VERSION
            }
        ));
    }

    #[test]
    fn test_stored_override_is_loaded() {
        let window = HeadlessWindow::new();
        let mut config = AppConfig::new();
        config.healthy_class = "Healthy".to_string();
        window.set_storage_item(
            AppConfig::STORAGE_KEY,
            &serde_json::to_string(&config).unwrap(),
        );

        let loaded = AppConfig::load_from_storage(&*window).unwrap();
        assert_eq!(loaded.healthy_class, "Healthy");
        assert_eq!(AppConfig::load_or_default(&*window), config);
    }

    #[test]
    fn test_invalid_stored_config_falls_back() {
        let window = HeadlessWindow::new();
        window.set_storage_item(AppConfig::STORAGE_KEY, "{not json");
        assert!(AppConfig::load_from_storage(&*window).is_none());
        assert_eq!(AppConfig::load_or_default(&*window), AppConfig::default());
    }

    #[test]
    fn test_unreadable_storage_falls_back() {
        let window = HeadlessWindow::new();
        window.set_storage_available(false);
        assert_eq!(AppConfig::load_or_default(&*window), AppConfig::default());
    }
}
