//! Random password generation.

use pwvault_core::config::GeneratorConfig;
use pwvault_core::SecretString;
use rand::rngs::OsRng;
use rand::Rng;

use crate::error::{Result, VaultError};

/// Default password length.
pub const DEFAULT_LENGTH: usize = 42;

/// Punctuation added to the alphabet when special characters are enabled.
pub const SPECIAL_CHARACTERS: &str = r"!#$%&()*+:,-./;<=>?@[]^_{|}~";

const ALPHANUMERIC: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Length and alphabet for generated passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub length: usize,
    pub special_characters: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            special_characters: true,
        }
    }
}

impl PasswordPolicy {
    /// Policy from the `generator` config section.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            length: config.length,
            special_characters: config.special_characters,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn without_special_characters(mut self) -> Self {
        self.special_characters = false;
        self
    }

    pub fn generate(&self) -> Result<SecretString> {
        generate(self.length, self.special_characters)
    }
}

/// Characters a password may be drawn from.
pub fn alphabet(include_special_characters: bool) -> Vec<char> {
    let mut chars: Vec<char> = ALPHANUMERIC.chars().collect();
    if include_special_characters {
        chars.extend(SPECIAL_CHARACTERS.chars());
    }
    chars
}

/// Draw `length` characters uniformly and independently from the alphabet
/// using the operating system's CSPRNG.
pub fn generate(length: usize, include_special_characters: bool) -> Result<SecretString> {
    if length == 0 {
        return Err(VaultError::InvalidLength(length));
    }

    let chars = alphabet(include_special_characters);
    let mut rng = OsRng;
    let password: String = (0..length)
        .map(|_| chars[rng.gen_range(0..chars.len())])
        .collect();

    Ok(SecretString::new(password))
}
