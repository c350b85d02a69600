//! Error types for the secrets store.

use std::path::PathBuf;

use pwvault_core::ConfigError;
use thiserror::Error;

/// Errors that can occur during vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Section not found: \"{0}\"")]
    SectionNotFound(String),

    #[error("\"{entity}\" not found in section \"{section}\"")]
    EntityNotFound { section: String, entity: String },

    #[error("\"{entity}\" has no attribute \"{attribute}\"")]
    AttributeNotFound { entity: String, attribute: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Secrets store {path} is corrupt: {reason}")]
    StoreCorrupt { path: PathBuf, reason: String },

    #[error("Invalid encryption key: {0}")]
    KeyFormat(String),

    #[error("No encryption key available: {0}")]
    KeyUnavailable(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("\"{0}\" has no \"password\" attribute")]
    MissingPassword(String),

    #[error("Password length must be at least 1, got {0}")]
    InvalidLength(usize),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VaultError {
    /// Missing section, entity or attribute. Callers render these as a
    /// message rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SectionNotFound(_) | Self::EntityNotFound { .. } | Self::AttributeNotFound { .. }
        )
    }
}

/// Convenience result alias for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
