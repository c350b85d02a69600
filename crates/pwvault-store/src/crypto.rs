//! AES-256-GCM field encryption with HKDF-SHA256 key derivation.
//!
//! Every value gets its own random salt; the master key is never used
//! directly as a cipher key. Salt and nonce travel with the ciphertext in a
//! single token:
//!
//! ```text
//! pwv1:<base64(salt[32] || nonce[12] || ciphertext || tag[16])>
//! ```
//!
//! Any decoding or authentication problem surfaces as
//! [`VaultError::Authentication`] so a caller can never observe a partially
//! decrypted value.

use std::fmt;
use std::str::FromStr;

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hkdf::Hkdf;
use pwvault_core::SecretString;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Result, VaultError};
use crate::model::AttributeValue;

const NONCE_SIZE: usize = 12;
const SALT_SIZE: usize = 32;
const TAG_SIZE: usize = 16;

/// Master key length in bytes.
pub const KEY_SIZE: usize = 32;

/// Marks a stored string as ciphertext produced by this module.
pub const CIPHERTEXT_PREFIX: &str = "pwv1:";

/// HKDF info string used to domain-separate derived keys.
const HKDF_INFO: &[u8] = b"pwvault-field-v1";

/// A 256-bit master key. Zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Key([u8; KEY_SIZE]);

impl Key {
    /// Parse a hex-encoded key. Surrounding whitespace is ignored.
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        // The decode error would echo the offending character, so it is dropped.
        let bytes = Zeroizing::new(
            hex::decode(hex_key.trim())
                .map_err(|_| VaultError::KeyFormat("key is not valid hex".to_string()))?,
        );
        let array: [u8; KEY_SIZE] = bytes.as_slice().try_into().map_err(|_| {
            VaultError::KeyFormat(format!(
                "key must be {KEY_SIZE} bytes ({} hex characters), got {} bytes",
                KEY_SIZE * 2,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Hex encoding, for handing a generated key to the operator.
    pub fn to_hex(&self) -> SecretString {
        SecretString::new(hex::encode(self.0))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Key {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key([REDACTED])")
    }
}

/// An encrypted attribute value in its stored token form.
#[derive(Clone, PartialEq, Eq)]
pub struct Ciphertext(String);

impl Ciphertext {
    /// Accept a stored string as ciphertext if it carries the token prefix,
    /// handing the string back otherwise.
    pub fn from_token(token: impl Into<String>) -> std::result::Result<Self, String> {
        let token = token.into();
        if token.starts_with(CIPHERTEXT_PREFIX) {
            Ok(Self(token))
        } else {
            Err(token)
        }
    }

    /// The token as written to the store.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ciphertext({} chars)", self.0.len())
    }
}

/// Derive a per-value 256-bit key from the master key and `salt`.
fn derive_key(key: &Key, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), key.as_bytes());
    let mut okm = Zeroizing::new([0u8; KEY_SIZE]);
    hk.expand(HKDF_INFO, &mut okm[..])
        .map_err(|e| VaultError::Encryption(format!("key derivation failed: {e}")))?;
    Ok(okm)
}

fn authentication(reason: &str) -> VaultError {
    VaultError::Authentication(reason.to_string())
}

/// Encrypt `plaintext` under `key`.
///
/// A fresh salt and nonce are drawn on every call, so encrypting the same
/// plaintext twice yields two different tokens.
pub fn encrypt(plaintext: &str, key: &Key) -> Result<Ciphertext> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);

    let derived = derive_key(key, &salt)?;
    let cipher = Aes256Gcm::new_from_slice(&derived[..])
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    let mut raw = Vec::with_capacity(SALT_SIZE + NONCE_SIZE + sealed.len());
    raw.extend_from_slice(&salt);
    raw.extend_from_slice(&nonce_bytes);
    raw.extend_from_slice(&sealed);

    Ok(Ciphertext(format!("{CIPHERTEXT_PREFIX}{}", STANDARD.encode(&raw))))
}

/// Decrypt a token produced by [`encrypt`].
pub fn decrypt(ciphertext: &Ciphertext, key: &Key) -> Result<SecretString> {
    let body = ciphertext
        .as_str()
        .strip_prefix(CIPHERTEXT_PREFIX)
        .ok_or_else(|| authentication("unsupported ciphertext version"))?;
    let raw = STANDARD
        .decode(body)
        .map_err(|_| authentication("ciphertext is not valid base64"))?;

    if raw.len() < SALT_SIZE + NONCE_SIZE + TAG_SIZE {
        return Err(authentication("ciphertext too short"));
    }

    let (salt, rest) = raw.split_at(SALT_SIZE);
    let (nonce_bytes, sealed) = rest.split_at(NONCE_SIZE);

    let derived = derive_key(key, salt)?;
    let cipher = Aes256Gcm::new_from_slice(&derived[..])
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|_| authentication("wrong key or tampered ciphertext"))?,
    );
    let text = std::str::from_utf8(&plaintext)
        .map_err(|_| authentication("decrypted value is not valid UTF-8"))?;

    Ok(SecretString::new(text))
}

/// Generate a new random 256-bit master key.
pub fn generate_key() -> Key {
    let mut bytes = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut bytes);
    let key = Key(bytes);
    bytes.zeroize();
    key
}

/// Field-level encryption bound to one master key.
///
/// This is the single place that decides what gets encrypted: every value
/// passed to [`FieldCipher::seal`] is stored as ciphertext, whatever its
/// attribute name.
pub struct FieldCipher {
    key: Key,
}

impl FieldCipher {
    pub fn new(key: Key) -> Self {
        Self { key }
    }

    /// Encrypt a plaintext into a storable attribute value.
    pub fn seal(&self, plaintext: &str) -> Result<AttributeValue> {
        Ok(AttributeValue::Encrypted(encrypt(plaintext, &self.key)?))
    }

    /// Decrypt an attribute value. Legacy plaintext passes through.
    pub fn reveal(&self, value: &AttributeValue) -> Result<SecretString> {
        match value {
            AttributeValue::Encrypted(ciphertext) => decrypt(ciphertext, &self.key),
            AttributeValue::Plain(text) => {
                warn!("reading an unencrypted attribute value; run `pw migrate` to encrypt it");
                Ok(SecretString::new(text.as_str()))
            }
        }
    }
}

impl fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldCipher").finish_non_exhaustive()
    }
}
