//! Config save/load roundtrip integration tests.
//!
//! These tests verify that configuration can be serialized, written to disk,
//! and loaded back with identical field values, and that a loaded config
//! drives where the store and its backups live.

use pwvault_core::config::Config;
use pwvault_store::StoreConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.generator.length, config.generator.length);
    assert_eq!(loaded.defaults.section, config.defaults.section);
    assert_eq!(loaded, config);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json5");

    let mut config = Config::default();
    config.generator.length = 16;
    config.vault.max_backups = Some(3);
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.generator.length, 16);
    assert_eq!(loaded.vault.max_backups, Some(3));
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/config.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json");
    assert!(result.is_err());
}

#[test]
fn test_store_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json5");
    std::fs::write(
        &path,
        r#"{
            // store lives outside the home directory
            vault: { path: "/srv/pw/store.json", max_backups: 10 },
        }"#,
    )
    .unwrap();

    let config = Config::load_or_default(Some(&path)).unwrap();
    let store = StoreConfig::from_config(&config).unwrap();
    assert_eq!(store.path, PathBuf::from("/srv/pw/store.json"));
    assert_eq!(store.backup_dir, PathBuf::from("/srv/pw/.backups"));
    assert_eq!(store.max_backups, Some(10));
}

#[test]
fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json5");
    std::fs::write(&path, r#"{ generator: { length: 0 }, logging: { level: "chatty" } }"#).unwrap();

    let err = Config::load_or_default(Some(&path)).unwrap_err().to_string();
    assert!(err.contains("Generator length"), "{err}");
    assert!(err.contains("chatty"), "{err}");
}
