//! Configuration for the session controller.
//!
//! Provides TOML loading, saving and validation for the controller's runtime
//! options.

use crate::errors::ControllerError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub session: SessionConfig,
    pub diagnostics: DiagnosticsConfig,
}

/// Session lifecycle options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Deadline for the asynchronous device-open callback, in milliseconds.
    /// Zero disables the timeout (the source platform applied none).
    pub open_timeout_ms: u64,
    /// Name given to the background frame worker thread.
    pub worker_thread_name: String,
}

/// Diagnostic logging options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Log every per-frame capture callback at debug level.
    pub verbose_frame_logging: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig {
                open_timeout_ms: 5000,
                worker_thread_name: "camsession-frames".to_string(),
            },
            diagnostics: DiagnosticsConfig {
                verbose_frame_logging: true,
            },
        }
    }
}

impl ControllerConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ControllerError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ControllerError::Config(format!("failed to read config file: {e}")))?;

        let config: ControllerConfig = toml::from_str(&contents)
            .map_err(|e| ControllerError::Config(format!("failed to parse config file: {e}")))?;

        log::info!("loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ControllerError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ControllerError::Config(format!("failed to create config directory: {e}"))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ControllerError::Config(format!("failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ControllerError::Config(format!("failed to write config file: {e}")))?;

        log::info!("saved configuration to {:?}", path);
        Ok(())
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        PathBuf::from("camsession.toml")
    }

    /// Load from the default location, or fall back to defaults.
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.session.open_timeout_ms > 600_000 {
            return Err("open timeout must be at most 600000 ms".to_string());
        }
        if self.session.worker_thread_name.is_empty() {
            return Err("worker thread name must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ControllerConfig::default();
        assert_eq!(config.session.open_timeout_ms, 5000);
        assert_eq!(config.session.worker_thread_name, "camsession-frames");
        assert!(config.diagnostics.verbose_frame_logging);
    }

    #[test]
    fn test_config_validation() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());

        let mut bad_timeout = config.clone();
        bad_timeout.session.open_timeout_ms = 600_001;
        assert!(bad_timeout.validate().is_err());

        let mut bad_name = config;
        bad_name.session.worker_thread_name.clear();
        assert!(bad_name.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("camsession.toml");

        let mut config = ControllerConfig::default();
        config.session.open_timeout_ms = 250;
        config.save_to_file(&config_path).unwrap();

        let loaded = ControllerConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.session.open_timeout_ms, 250);
        assert_eq!(
            loaded.session.worker_thread_name,
            config.session.worker_thread_name
        );
    }

    #[test]
    fn test_config_toml_format() {
        let config = ControllerConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[session]"));
        assert!(toml_string.contains("[diagnostics]"));
        assert!(toml_string.contains("open_timeout_ms"));
        assert!(toml_string.contains("verbose_frame_logging"));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ControllerConfig::load_from_file("nonexistent_file.toml");
        assert!(result.is_ok());
        assert_eq!(result.unwrap().session.open_timeout_ms, 5000);
    }
}
