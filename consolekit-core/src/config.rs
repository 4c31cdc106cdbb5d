//! Configuration management
//!
//! The console reads a single TOML document describing logging, where session
//! tokens are persisted, and which storage keys hold them.

use crate::error::{ConsoleError, ConsoleResult, ErrorContext};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default storage key for the access token
pub const DEFAULT_ACCESS_TOKEN_KEY: &str = "access_token";
/// Default storage key for the refresh token
pub const DEFAULT_REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Top-level console configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub session: SessionSettings,
}

/// Where persisted session tokens live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory only; tokens do not survive a restart
    Memory,
    /// JSON document on disk
    File,
}

/// Token persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// File path for the `file` backend; defaults to [`default_storage_path`]
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: None,
        }
    }
}

impl StorageConfig {
    /// In-memory storage, used by tests and short-lived tools
    pub fn memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            path: None,
        }
    }

    /// File storage at an explicit path
    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            backend: StorageBackend::File,
            path: Some(path.into()),
        }
    }

    /// Resolve the on-disk location for the file backend
    pub fn resolved_path(&self) -> ConsoleResult<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => default_storage_path(),
        }
    }
}

/// Storage key names used by the session store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub access_token_key: String,
    pub refresh_token_key: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            access_token_key: DEFAULT_ACCESS_TOKEN_KEY.to_string(),
            refresh_token_key: DEFAULT_REFRESH_TOKEN_KEY.to_string(),
        }
    }
}

/// `<data_dir>/consolekit/session.json`
pub fn default_storage_path() -> ConsoleResult<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("consolekit").join("session.json"))
        .ok_or_else(|| ConsoleError::Config {
            message: "Could not determine the user data directory".to_string(),
            source: None,
            context: ErrorContext::new("config")
                .with_operation("default_storage_path")
                .with_suggestion("Set storage.path explicitly"),
        })
}

impl ConsoleConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConsoleResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConsoleError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_metadata("path", &path.display().to_string())
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: ConsoleConfig = toml::from_str(&content).map_err(|e| ConsoleError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConsoleResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConsoleError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| ConsoleError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// Token keys are checked exactly as the session store will use them.
    pub fn validate(&self) -> ConsoleResult<()> {
        let access_key = self.session.access_token_key.as_str();
        let refresh_key = self.session.refresh_token_key.as_str();

        validate_key(access_key, "session.access_token_key")?;
        validate_key(refresh_key, "session.refresh_token_key")?;

        if access_key == refresh_key {
            return Err(crate::validation_error!(
                "Access and refresh tokens must use different storage keys",
                "session.refresh_token_key",
                "config"
            ));
        }

        if self.storage.backend == StorageBackend::File {
            self.storage.resolved_path()?;
        }

        Ok(())
    }
}

fn validate_key(key: &str, field: &str) -> ConsoleResult<()> {
    if key.trim().is_empty() {
        return Err(crate::validation_error!(
            "Token storage key must not be empty",
            field,
            "config"
        ));
    }
    if key.trim() != key {
        return Err(crate::validation_error!(
            "Token storage key must not have leading or trailing whitespace",
            field,
            "config"
        ));
    }
    Ok(())
}
