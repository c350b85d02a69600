//! Path resolution utilities.

use crate::env::{self, vars};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Name of the backup directory created next to the store file.
pub const BACKUP_DIR_NAME: &str = ".backups";

/// Get the pwvault base directory (`$PWVAULT_HOME` or `~/.pwvault`).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::get_var(vars::PWVAULT_HOME) {
        return Ok(expand_tilde(&home));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".pwvault"))
}

/// Get the config file path (`<base>/config.json5`).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("config.json5"))
}

/// Get the default secrets store path (`<base>/secrets.json`).
pub fn vault_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("secrets.json"))
}

/// Get the backup directory for a store file (a `.backups` sibling).
pub fn backup_dir_for(store_file: &Path) -> PathBuf {
    match store_file.parent() {
        Some(parent) => parent.join(BACKUP_DIR_NAME),
        None => PathBuf::from(BACKUP_DIR_NAME),
    }
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Expand tilde in an already-parsed path.
pub fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => expand_tilde(s),
        None => path.to_path_buf(),
    }
}
