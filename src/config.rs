//! Configuration file support for the cg front end.
//!
//! Settings are kept as versioned JSON. The browser build reads them from
//! `localStorage`, the native monitor from the user's config directory.
//! Anything missing or unreadable falls back to the defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_STORAGE_KEY, DEFAULT_ELAPSED_PREFIX, DEFAULT_ELAPSED_SUFFIX, DEFAULT_GRID_CELL_HEIGHT,
    DEFAULT_LOADING_MESSAGE, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_INTERVAL_MS, DEFAULT_WS_HOST,
    DEFAULT_WS_PORT, ws_url,
};
use crate::storage::{KeyValueStore, StorageError};

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
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

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

    /// Convert to log crate's Level.
    pub fn to_level(&self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Push channel settings
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Completion service settings
    #[serde(default)]
    pub suggest: SuggestConfig,

    /// Gallery settings
    #[serde(default)]
    pub gallery: GalleryConfig,
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Text shown under the loading image
    #[serde(default = "default_loading_message")]
    pub loading_message: String,

    /// Text before the elapsed seconds
    #[serde(default = "default_elapsed_prefix")]
    pub elapsed_prefix: String,

    /// Text after the elapsed seconds
    #[serde(default = "default_elapsed_suffix")]
    pub elapsed_suffix: String,
}

fn default_loading_message() -> String {
    DEFAULT_LOADING_MESSAGE.to_string()
}

fn default_elapsed_prefix() -> String {
    DEFAULT_ELAPSED_PREFIX.to_string()
}

fn default_elapsed_suffix() -> String {
    DEFAULT_ELAPSED_SUFFIX.to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            loading_message: default_loading_message(),
            elapsed_prefix: default_elapsed_prefix(),
            elapsed_suffix: default_elapsed_suffix(),
        }
    }
}

/// Push channel section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Fixed delay between reconnect attempts
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Reconnect attempts before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_host() -> String {
    DEFAULT_WS_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_WS_PORT
}

fn default_retry_interval_ms() -> u64 {
    DEFAULT_RETRY_INTERVAL_MS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            retry_interval_ms: default_retry_interval_ms(),
            max_retries: default_max_retries(),
        }
    }
}

impl ChannelConfig {
    pub fn url(&self) -> String {
        ws_url(&self.host, self.port)
    }
}

/// Completion service section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// Origin of the completion service; empty means the page origin
    #[serde(default)]
    pub base_url: String,

    /// Quiet period after the last keystroke
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    cg_ui::constants::SUGGESTION_DEBOUNCE_MS
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Gallery section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Height of a grid cell in pixels
    #[serde(default = "default_grid_cell_height")]
    pub grid_cell_height: f32,
}

fn default_grid_cell_height() -> f32 {
    DEFAULT_GRID_CELL_HEIGHT
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            grid_cell_height: default_grid_cell_height(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: UserPreferences::default(),
            channel: ChannelConfig::default(),
            suggest: SuggestConfig::default(),
            gallery: GalleryConfig::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
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

    /// Load from a key-value store, falling back to defaults.
    pub fn load_from_store(store: &dyn KeyValueStore) -> Self {
        match store.get(CONFIG_STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from storage");
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse stored configuration: {}", e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::debug!("No stored configuration, using defaults");
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to read configuration: {}", e);
                Self::default()
            }
        }
    }

    /// Save into a key-value store.
    pub fn save_to_store(&self, store: &dyn KeyValueStore) -> Result<(), ConfigError> {
        let json = self.to_json()?;
        store.set(CONFIG_STORAGE_KEY, &json)?;
        log::info!("Saved configuration to storage");
        Ok(())
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "config.json"
    }

    /// Get the default config file path.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("cg_frontend").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("cg_frontend")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from `path`, falling back to defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Self {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Load configuration from the default path, falling back to defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from_path(&path),
            None => Self::default(),
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(&path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
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

    /// Version mismatch
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Key-value storage error
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_config_roundtrip() {
        let mut config = AppConfig::new();
        config.channel.port = 9000;
        config.preferences.log_level = LogLevel::Debug;

        let json = config.to_json().unwrap();
        let loaded = AppConfig::from_json(&json).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.channel.url(), "ws://127.0.0.1:9000/ws");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = AppConfig::from_json(r#"{"version":1,"channel":{"port":1234}}"#).unwrap();
        assert_eq!(config.channel.port, 1234);
        assert_eq!(config.channel.host, "127.0.0.1");
        assert_eq!(config.channel.max_retries, 10);
        assert_eq!(config.channel.retry_interval_ms, 500);
        assert_eq!(config.suggest.debounce_ms, 50);
        assert_eq!(config.gallery.grid_cell_height, 200.0);
        assert_eq!(config.preferences.loading_message, "Processing...");
    }

    #[test]
    fn test_version_too_new() {
        let json = format!(r#"{{"version":{}}}"#, CONFIG_VERSION + 1);
        assert!(matches!(
            AppConfig::from_json(&json),
            Err(ConfigError::VersionTooNew { .. })
        ));
    }

    #[test]
    fn test_store_fallback() {
        let store = MemoryStore::new();
        assert_eq!(AppConfig::load_from_store(&store), AppConfig::default());

        store.set(CONFIG_STORAGE_KEY, "{broken").unwrap();
        assert_eq!(AppConfig::load_from_store(&store), AppConfig::default());

        let mut config = AppConfig::new();
        config.suggest.base_url = "http://localhost:7860".to_string();
        config.save_to_store(&store).unwrap();
        assert_eq!(AppConfig::load_from_store(&store), config);
    }

    #[test]
    fn test_log_level_serde() {
        assert_eq!(serde_json::to_string(&LogLevel::Warn).unwrap(), "\"warn\"");
        assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
        assert_eq!(LogLevel::Info.name(), "Info");
    }
}
