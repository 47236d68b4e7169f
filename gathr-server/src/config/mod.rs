//! Configuration module for gathr-server.
//!
//! Handles loading configuration from the TOML file, CLI arguments and
//! environment variables.

pub mod file;

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::file::FileConfig;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// Reads the TOML file, applies CLI overrides and validates the result.
    pub fn load(&self) -> Result<FileConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;
        Ok(file_config)
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if !config.database.url.starts_with("sqlite:") {
        return Err(ConfigError::ValidationError(format!(
            "database.url must be a sqlite: url, got {}",
            config.database.url
        )));
    }
    if !(1..=64).contains(&config.database.max_connections) {
        return Err(ConfigError::ValidationError(
            "database.max_connections must be between 1 and 64".to_owned(),
        ));
    }
    Ok(())
}

/// Resolve the database URL: the `DATABASE_URL` environment variable wins
/// over the config file.
pub fn database_url(config: &FileConfig) -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| config.database.url.clone())
}
