//! Configuration management for uitrace
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/uitrace/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{Result, TraceError};

/// Default timeout for explicit `wait_for` steps
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5000;

/// Main configuration for uitrace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Browser driver configuration
    pub browser: BrowserConfig,
    /// Dataset output configuration
    #[serde(default)]
    pub dataset: DatasetConfig,
    /// Executor configuration
    #[serde(default)]
    pub executor: ExecutorConfig,
}

/// Browser automation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Session name for agent-browser
    pub session_name: String,
    /// Whether to run in headed mode (visible browser)
    pub headed: bool,
    /// Upper bound for a single browser command in ms
    pub timeout_ms: u64,
}

/// Where dataset entries are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Root directory of the dataset
    pub out_dir: PathBuf,
}

/// Task executor behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Timeout for `wait_for` steps that don't set one
    pub wait_timeout_ms: u64,
    /// Whether to show debug output
    pub debug: bool,
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| v == "true" || v == "1")
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            session_name: env::var("UITRACE_BROWSER_SESSION")
                .unwrap_or_else(|_| "uitrace".to_string()),
            headed: env_flag("UITRACE_BROWSER_HEADED").unwrap_or(false),
            timeout_ms: env_u64("UITRACE_BROWSER_TIMEOUT_MS").unwrap_or(30000),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            out_dir: env::var("UITRACE_OUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("dataset")),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: env_u64("UITRACE_WAIT_TIMEOUT_MS").unwrap_or(DEFAULT_WAIT_TIMEOUT_MS),
            debug: env_flag("UITRACE_DEBUG").unwrap_or(false),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("uitrace")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(TraceError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| TraceError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| TraceError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| TraceError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| TraceError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(Self::config_file(), content)
            .map_err(|e| TraceError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }
}
