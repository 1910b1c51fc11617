//! Configuration for lazymemo.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::MemoResult;

/// Main configuration for lazymemo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Persistent store settings.
    #[serde(default)]
    pub store: StoreConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Storage backend behind the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// SQLite file at `store.path`.
    Sqlite,
    /// Process-local map, lost on exit.
    Memory,
}

/// How a fingerprint is turned into a store key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeyEncoding {
    /// Hex SHA256 digest of the fingerprint.
    Sha256,
    /// The fingerprint text itself.
    Raw,
}

/// Persistent store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend kind.
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// Store file path (sqlite backend).
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Key encoding.
    #[serde(default = "default_key_encoding")]
    pub key_encoding: KeyEncoding,

    /// Entries kept in the in-process read cache (0 disables it).
    #[serde(default = "default_hot_capacity")]
    pub hot_capacity: usize,
}

impl StoreConfig {
    /// Settings for a sqlite store at `path`, everything else default.
    pub fn at<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_store_path(),
            key_encoding: default_key_encoding(),
            hot_capacity: default_hot_capacity(),
        }
    }
}

fn default_backend() -> StoreBackend {
    StoreBackend::Sqlite
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".lazymemo/cache.db")
}

fn default_key_encoding() -> KeyEncoding {
    KeyEncoding::Sha256
}

fn default_hot_capacity() -> usize {
    256
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> MemoResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> MemoResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            store: StoreConfig::default(),
        }
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    ///
    /// A file that exists but does not parse is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> MemoResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default_config())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
