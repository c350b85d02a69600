//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Environment variable names read by pwvault.
pub mod vars {
    /// Overrides the pwvault home directory (`~/.pwvault`).
    pub const PWVAULT_HOME: &str = "PWVAULT_HOME";

    /// Overrides the config file path.
    pub const PWVAULT_CONFIG: &str = "PWVAULT_CONFIG";

    /// Hex-encoded 32-byte encryption key.
    pub const PWVAULT_KEY: &str = "PWVAULT_KEY";

    /// Disables coloured terminal output when set to anything.
    pub const NO_COLOR: &str = "NO_COLOR";
}
