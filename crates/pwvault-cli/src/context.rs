//! Per-invocation state shared by the commands.

use std::path::PathBuf;

use pwvault_core::{paths, Config, ConfigError};
use pwvault_store::keysource;
use pwvault_store::{FieldCipher, PasswordPolicy, Repository, StoreConfig};
use tracing::debug;

/// The loaded configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct Context {
    config: Config,
    config_path: Option<PathBuf>,
}

impl Context {
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The `--config` path, or the default config file.
    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.config_path {
            Some(path) => Ok(paths::expand_path(path)),
            None => paths::config_file(),
        }
    }

    /// The requested section, or the configured default.
    pub fn section<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(&self.config.defaults.section)
    }

    pub fn default_attribute(&self) -> &str {
        &self.config.defaults.attribute
    }

    /// Whether a value goes to the clipboard: `--copy` or `defaults.copy`.
    pub fn copy(&self, requested: bool) -> bool {
        requested || self.config.defaults.copy
    }

    pub fn repository(&self) -> pwvault_store::Result<Repository> {
        let store = StoreConfig::from_config(&self.config)?;
        debug!(
            path = %store.path.display(),
            backups = %store.backup_dir.display(),
            "opening secrets store"
        );
        Repository::load(store)
    }

    /// Resolve the key and build the cipher. Only commands that encrypt or
    /// decrypt call this, so listing works without a key.
    pub fn cipher(&self) -> pwvault_store::Result<FieldCipher> {
        Ok(FieldCipher::new(keysource::resolve_key(&self.config)?))
    }

    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy::from_config(&self.config.generator)
    }
}
