//! Configuration management module.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub list: ListConfig,
}

/// Remote GraphQL endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Endpoint URL (e.g. "https://api.example.com/graphql").
    pub endpoint: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Session and credential settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Durable token file. Absent means the token is held in memory only.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    /// Route users are sent to when admission fails.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Path prefix requiring a valid, unexpired token.
    #[serde(default = "default_protected_prefix")]
    pub protected_prefix: String,
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_protected_prefix() -> String {
    "/departments".to_string()
}

/// Department list settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// Fixed page size for the department list (default: 10).
    pub page_size: u32,
}

impl AppConfig {
    /// Get config file path (platform config directory).
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "deptctl")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Default durable token location (platform data directory).
    pub fn default_token_file() -> PathBuf {
        ProjectDirs::from("", "", "deptctl")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("token")
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.endpoint.trim().is_empty() {
            return Err(ConfigError::Validation("API endpoint cannot be empty".to_string()));
        }
        if !self.api.endpoint.starts_with("http") {
            return Err(ConfigError::Validation(
                "API endpoint must start with http:// or https://".to_string(),
            ));
        }
        if self.api.timeout_secs < 1 {
            return Err(ConfigError::Validation(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.list.page_size < 1 {
            return Err(ConfigError::Validation("Page size must be at least 1".to_string()));
        }
        if self.list.page_size > 100 {
            return Err(ConfigError::Validation("Page size cannot exceed 100".to_string()));
        }
        if !self.session.login_path.starts_with('/') {
            return Err(ConfigError::Validation("Login path must start with /".to_string()));
        }
        if !self.session.protected_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "Protected prefix must start with /".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4000/graphql".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_file: Some(AppConfig::default_token_file()),
            login_path: default_login_path(),
            protected_prefix: default_protected_prefix(),
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}
