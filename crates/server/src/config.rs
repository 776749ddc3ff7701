//! Configuration management for the Edulib server.
//!
//! This module provides TOML-based configuration file loading and saving.
//! The default configuration path is `~/.config/edulib/config.toml`.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use library::{LibraryOptions, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Upper bound accepted for `library.max_depth`.
pub const MAX_LISTING_DEPTH: usize = 256;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("bind_addr must be a socket address like 127.0.0.1:5000, got {0}")]
    InvalidBindAddr(String),

    #[error("max_depth must be between 1 and 256, got {0}")]
    InvalidMaxDepth(usize),

    #[error("log_level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure for the Edulib server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,

    /// Library location and listing configuration.
    pub library: LibraryConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: String,

    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Allow cross-origin requests from any origin.
    pub cors: bool,

    /// Directory served under `/static`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

/// Library configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LibraryConfig {
    /// Root directory of the library.
    pub root: PathBuf,

    /// Folder levels expanded in listings.
    pub max_depth: usize,

    /// Create the root directory on startup if it is missing.
    pub create_missing: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_level: "info".to_string(),
            cors: true,
            static_dir: None,
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: default_library_root(),
            max_depth: DEFAULT_MAX_DEPTH,
            create_missing: true,
        }
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("edulib")
        .join("config.toml")
}

/// Returns the default library root.
fn default_library_root() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("edulib")
        .join("library")
}

impl Config {
    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables take precedence over config file values.
    /// Supported variables:
    /// - EDULIB_LIBRARY_PATH: Override the library root
    /// - EDULIB_BIND_ADDR: Override the HTTP bind address
    /// - EDULIB_LOG_LEVEL: Override log level (trace, debug, info, warn, error)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("EDULIB_LIBRARY_PATH") {
            if !path.is_empty() {
                tracing::info!("Overriding library root from environment: {}", path);
                self.library.root = PathBuf::from(path);
            }
        }

        if let Ok(addr) = std::env::var("EDULIB_BIND_ADDR") {
            if !addr.is_empty() {
                tracing::info!("Overriding bind_addr from environment: {}", addr);
                self.server.bind_addr = addr;
            }
        }

        if let Ok(level) = std::env::var("EDULIB_LOG_LEVEL") {
            if !level.is_empty() {
                tracing::info!("Overriding log_level from environment: {}", level);
                self.server.log_level = level;
            }
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::InvalidBindAddr(self.server.bind_addr.clone()));
        }

        if self.library.max_depth < 1 || self.library.max_depth > MAX_LISTING_DEPTH {
            return Err(ConfigError::InvalidMaxDepth(self.library.max_depth));
        }

        let level = self.server.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.server.log_level.clone()));
        }

        Ok(())
    }

    /// Parsed bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.server.bind_addr))
    }

    /// Options handed to the library manager.
    pub fn library_options(&self) -> LibraryOptions {
        LibraryOptions {
            max_depth: self.library.max_depth,
            create_missing: self.library.create_missing,
        }
    }

    /// Load configuration from a file.
    ///
    /// If the file does not exist, returns the default configuration.
    /// If the file exists but is invalid TOML, returns an error with
    /// a helpful message.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_path())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Invalid TOML configuration: {}", format_toml_error(&e)))
    }

    /// Save configuration to a file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }
}

/// Format a TOML deserialization error for user-friendly display.
fn format_toml_error(error: &toml::de::Error) -> String {
    let mut msg = error.message().to_string();

    if let Some(span) = error.span() {
        msg.push_str(&format!(" (at position {}..{})", span.start, span.end));
    }

    msg
}
