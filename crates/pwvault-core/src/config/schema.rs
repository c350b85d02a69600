//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main pwvault configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Secrets store location and backup policy.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Encryption key source.
    #[serde(default)]
    pub encryption: EncryptionConfig,

    /// Random password defaults.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Default section and attribute for lookups.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Secrets store configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Store file. Defaults to `<home>/secrets.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Backup directory. Defaults to `.backups` next to the store file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,

    /// Keep at most this many backups; unset keeps all of them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_backups: Option<usize>,
}

/// Where the encryption key comes from when `PWVAULT_KEY` is not set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncryptionConfig {
    /// File holding the hex-encoded key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,
}

/// Random password generator defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of characters.
    #[serde(default = "default_password_length")]
    pub length: usize,

    /// Include punctuation in the alphabet.
    #[serde(default = "default_true")]
    pub special_characters: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: default_password_length(),
            special_characters: true,
        }
    }
}

fn default_password_length() -> usize {
    42
}

fn default_true() -> bool {
    true
}

/// Lookup defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Section used when a command does not name one.
    #[serde(default = "default_section")]
    pub section: String,

    /// Attribute returned by `pw get` when no `--key` is given.
    #[serde(default = "default_attribute")]
    pub attribute: String,

    /// Copy values to the clipboard as if `--copy` were given.
    #[serde(default)]
    pub copy: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            section: default_section(),
            attribute: default_attribute(),
            copy: false,
        }
    }
}

fn default_section() -> String {
    "main".to_string()
}

fn default_attribute() -> String {
    "password".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when neither `RUST_LOG` nor `-v` is given.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
