//! # pwvault-core
//!
//! Configuration and shared utilities for pwvault.
//!
//! - **Configuration**: loading, validation and persistence of `config.json5`
//! - **Paths**: resolution of the pwvault home, store file and backup directory
//! - **Secrets in memory**: [`SecretString`], zeroed on drop and never printed

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, Result};
pub use secret::SecretString;
