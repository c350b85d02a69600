//! Configuration loading and persistence.

use super::Config;
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load from `path` (or the default path), falling back to defaults when
    /// the file does not exist. Parse and validation errors are returned.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let loaded = match path {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        };

        let config = match loaded {
            Ok(config) => config,
            Err(ConfigError::NotFound(missing)) => {
                tracing::debug!(path = %missing.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer; plain JSON is valid JSON5
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.generator.length == 0 {
            errors.push("Generator length must be at least 1".to_string());
        }

        if self.defaults.section.trim().is_empty() {
            errors.push("Default section must not be empty".to_string());
        }

        if self.defaults.attribute.trim().is_empty() {
            errors.push("Default attribute must not be empty".to_string());
        }

        if self.vault.max_backups == Some(0) {
            errors.push("vault.max_backups must be at least 1 when set".to_string());
        }

        if let Some(path) = &self.vault.path {
            if path.as_os_str().is_empty() {
                errors.push("vault.path must not be empty when set".to_string());
            }
        }

        if self.logging.level.trim().parse::<tracing::Level>().is_err() {
            errors.push(format!(
                "Unknown logging level '{}', expected one of trace, debug, info, warn, error",
                self.logging.level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Resolved secrets store path.
    pub fn vault_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.vault.path {
            Some(path) => Ok(paths::expand_path(path)),
            None => paths::vault_file(),
        }
    }

    /// Resolved backup directory.
    pub fn backup_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.vault.backup_dir {
            Some(dir) => Ok(paths::expand_path(dir)),
            None => Ok(paths::backup_dir_for(&self.vault_path()?)),
        }
    }

    /// Resolved key file, if one is configured.
    pub fn key_file(&self) -> Option<PathBuf> {
        self.encryption.key_file.as_deref().map(paths::expand_path)
    }
}
