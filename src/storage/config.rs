//! JSON Configuration Management
//!
//! Handles reading and writing the engine configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::settings::EngineConfig;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_parent};

/// Configuration service for loading and saving engine settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: EngineConfig,
}

impl ConfigService {
    /// Load the config at `path`, or defaults when the file does not exist.
    ///
    /// A file that exists but does not parse or validate is an error.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let config_path = path.as_ref().to_path_buf();
        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            tracing::debug!(path = %config_path.display(), "config file not found, using defaults");
            EngineConfig::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load from the default location (~/.screen-insight/config.json)
    pub fn load_default() -> AppResult<Self> {
        Self::load(config_path()?)
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<EngineConfig> {
        let content = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|e| AppError::config(format!("{}: {}", path.display(), e)))?;
        config.validate().map_err(AppError::validation)?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting
    fn save_to_file(path: &Path, config: &EngineConfig) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        ensure_parent(path)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consume the service, handing the configuration to the engine
    pub fn into_config(self) -> EngineConfig {
        self.config
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Save the current configuration to disk
    pub fn save(&self) -> AppResult<()> {
        Self::save_to_file(&self.config_path, &self.config)
    }

    /// Overwrite the file at `path` with defaults.
    ///
    /// The existing file is not read, so a broken config can be reset.
    pub fn reset(path: impl AsRef<Path>) -> AppResult<Self> {
        let service = Self {
            config_path: path.as_ref().to_path_buf(),
            config: EngineConfig::default(),
        };
        service.save()?;
        tracing::info!(path = %service.config_path.display(), "configuration reset to defaults");
        Ok(service)
    }
}
