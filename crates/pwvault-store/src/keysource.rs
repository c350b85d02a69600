//! Encryption key sourcing.
//!
//! The key is resolved in priority order:
//! 1. `PWVAULT_KEY` environment variable (hex-encoded)
//! 2. The file named by `encryption.key_file` in the config
//!
//! There is no fallback to generating a key on the fly: a fresh key would
//! not decrypt anything already in the store. `pw keygen` writes one
//! explicitly.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use pwvault_core::env::{self, vars};
use pwvault_core::Config;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::crypto::Key;
use crate::error::{Result, VaultError};

/// Resolve the master key from the environment and `config`.
pub fn resolve_key(config: &Config) -> Result<Key> {
    resolve_key_from(env::get_var(vars::PWVAULT_KEY), config.key_file().as_deref())
}

/// Resolve the master key from an explicit env value and key file path.
pub fn resolve_key_from(env_value: Option<String>, key_file: Option<&Path>) -> Result<Key> {
    if let Some(hex_key) = env_value.map(Zeroizing::new) {
        debug!("using encryption key from {}", vars::PWVAULT_KEY);
        return Key::from_hex(&hex_key).map_err(|e| match e {
            VaultError::KeyFormat(reason) => {
                VaultError::KeyFormat(format!("{}: {reason}", vars::PWVAULT_KEY))
            }
            other => other,
        });
    }

    if let Some(path) = key_file {
        debug!(path = %path.display(), "using encryption key from key file");
        return read_key_file(path);
    }

    Err(VaultError::KeyUnavailable(format!(
        "set {} or configure encryption.key_file (generate one with `pw keygen`)",
        vars::PWVAULT_KEY
    )))
}

/// Read a hex-encoded key from `path`.
pub fn read_key_file(path: &Path) -> Result<Key> {
    let content = match fs::read_to_string(path) {
        Ok(content) => Zeroizing::new(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(VaultError::KeyUnavailable(format!(
                "key file {} does not exist",
                path.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(path)?.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            warn!(
                path = %path.display(),
                mode = %format!("{mode:o}"),
                "key file is readable by other users; chmod 600 it"
            );
        }
    }

    Key::from_hex(&content).map_err(|e| match e {
        VaultError::KeyFormat(reason) => {
            VaultError::KeyFormat(format!("{}: {reason}", path.display()))
        }
        other => other,
    })
}

/// Write `key` to `path` as hex with mode 0600. Refuses to replace an
/// existing file unless `force` is set.
pub fn write_key_file(path: &Path, key: &Key, force: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    let hex_key = key.to_hex();
    writeln!(file, "{}", hex_key.expose_secret())?;
    file.sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    debug!(path = %path.display(), "wrote encryption key file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{decrypt, encrypt, generate_key};
    use tempfile::TempDir;

    const HEX_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn test_env_value_wins_over_key_file() {
        let tmp = TempDir::new().unwrap();
        let file_key = generate_key();
        let path = tmp.path().join("key");
        write_key_file(&path, &file_key, false).unwrap();

        let key = resolve_key_from(Some(HEX_KEY.to_string()), Some(&path)).unwrap();
        assert_eq!(key.to_hex().expose_secret(), HEX_KEY);
    }

    #[test]
    fn test_key_file_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("keys").join("pwvault.key");
        let key = generate_key();
        write_key_file(&path, &key, false).unwrap();

        let loaded = resolve_key_from(None, Some(&path)).unwrap();
        let ciphertext = encrypt("s3cret", &key).unwrap();
        assert_eq!(decrypt(&ciphertext, &loaded).unwrap().expose_secret(), "s3cret");
    }

    #[test]
    fn test_no_source_is_unavailable() {
        assert!(matches!(
            resolve_key_from(None, None),
            Err(VaultError::KeyUnavailable(_))
        ));
    }

    #[test]
    fn test_missing_key_file_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            resolve_key_from(None, Some(&tmp.path().join("absent"))),
            Err(VaultError::KeyUnavailable(_))
        ));
    }

    #[test]
    fn test_malformed_env_value() {
        let err = resolve_key_from(Some("abcd".to_string()), None).unwrap_err();
        assert!(matches!(err, VaultError::KeyFormat(_)));
        assert!(err.to_string().contains("PWVAULT_KEY"));
    }

    #[test]
    fn test_write_refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("key");
        let first = generate_key();
        write_key_file(&path, &first, false).unwrap();

        let second = generate_key();
        assert!(write_key_file(&path, &second, false).is_err());
        let kept = read_key_file(&path).unwrap();
        assert_eq!(kept.to_hex(), first.to_hex());

        write_key_file(&path, &second, true).unwrap();
        assert_eq!(read_key_file(&path).unwrap().to_hex(), second.to_hex());
    }

    #[cfg(unix)]
    #[test]
    fn test_key_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("key");
        write_key_file(&path, &generate_key(), false).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "key file should have 0600 permissions");
    }
}
