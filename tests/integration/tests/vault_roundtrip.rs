//! Store integration tests.
//!
//! These drive the repository, the field cipher and the backups together
//! through a real store file, the way the CLI does across invocations.

use std::fs;

use pwvault_store::backup::list_backups;
use pwvault_store::crypto::generate_key;
use pwvault_store::keysource::{resolve_key_from, write_key_file};
use pwvault_store::{
    AttributeValue, Entity, FieldCipher, Repository, StoreConfig, Upsert, Vault, VaultError,
};
use tempfile::TempDir;

fn entity(cipher: &FieldCipher, fields: &[(&str, &str)]) -> Entity {
    fields
        .iter()
        .map(|(name, value)| (name.to_string(), cipher.seal(value).unwrap()))
        .collect()
}

#[test]
fn test_round_trip_across_processes() {
    let dir = TempDir::new().unwrap();
    let store = StoreConfig::new(dir.path().join("secrets.json"));
    let cipher = FieldCipher::new(generate_key());

    {
        let mut repo = Repository::load(store.clone()).unwrap();
        repo.upsert_entity(
            "main",
            "GitHub",
            entity(&cipher, &[("password", "pw1"), ("username", "octocat")]),
            false,
        )
        .unwrap();
        repo.upsert_entity("dev", "Gitea", entity(&cipher, &[("password", "pw2")]), false)
            .unwrap();
    }

    let repo = Repository::load(store).unwrap();
    assert_eq!(repo.list_sections(), vec!["main", "dev"]);

    let value = repo.get_attribute("dev", "Gitea", "password").unwrap();
    assert_eq!(cipher.reveal(value).unwrap().expose_secret(), "pw2");

    let hits: Vec<(&str, &str)> = repo
        .find_entities("GIT")
        .map(|hit| (hit.section, hit.entity))
        .collect();
    assert_eq!(hits, vec![("main", "GitHub"), ("dev", "Gitea")]);
}

#[test]
fn test_every_backup_is_a_pre_mutation_snapshot() {
    let dir = TempDir::new().unwrap();
    let store = StoreConfig::new(dir.path().join("secrets.json"));
    let cipher = FieldCipher::new(generate_key());
    let mut repo = Repository::load(store).unwrap();

    let mut history: Vec<Vault> = Vec::new();
    history.push(repo.vault().clone());
    repo.create_section("dev").unwrap();
    history.push(repo.vault().clone());
    repo.upsert_entity("dev", "Gitea", entity(&cipher, &[("password", "a")]), false)
        .unwrap();
    history.push(repo.vault().clone());
    repo.update_attribute("dev", "Gitea", "username", cipher.seal("me").unwrap())
        .unwrap();
    history.push(repo.vault().clone());
    repo.remove_entity("dev", "Gitea").unwrap();
    history.push(repo.vault().clone());
    repo.remove_section("dev").unwrap();

    assert!(repo.list_sections().is_empty());
    let backups = list_backups(&repo.config().backup_dir).unwrap();
    assert_eq!(backups.len(), 5);
    for (path, expected) in backups.iter().zip(&history) {
        let snapshot: Vault = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(&snapshot, expected, "{}", path.display());
    }
}

#[test]
fn test_wrong_key_never_reveals() {
    let dir = TempDir::new().unwrap();
    let store = StoreConfig::new(dir.path().join("secrets.json"));
    let writer = FieldCipher::new(generate_key());
    let reader = FieldCipher::new(generate_key());

    let mut repo = Repository::load(store.clone()).unwrap();
    repo.upsert_entity("main", "GitHub", entity(&writer, &[("password", "pw")]), false)
        .unwrap();

    // Loading never decrypts, so the wrong key only fails on read.
    let repo = Repository::load(store).unwrap();
    let value = repo.get_attribute("main", "GitHub", "password").unwrap();
    assert!(matches!(
        reader.reveal(value),
        Err(VaultError::Authentication(_))
    ));
}

#[test]
fn test_key_file_decrypts_store() {
    let dir = TempDir::new().unwrap();
    let key_path = dir.path().join("pw.key");
    write_key_file(&key_path, &generate_key(), false).unwrap();

    let cipher = FieldCipher::new(resolve_key_from(None, Some(&key_path)).unwrap());
    let store = StoreConfig::new(dir.path().join("secrets.json"));
    let mut repo = Repository::load(store.clone()).unwrap();
    repo.upsert_entity("main", "Bank", entity(&cipher, &[("password", "1234")]), false)
        .unwrap();

    let again = FieldCipher::new(resolve_key_from(None, Some(&key_path)).unwrap());
    let repo = Repository::load(store).unwrap();
    let value = repo.get_attribute("main", "Bank", "password").unwrap();
    assert_eq!(again.reveal(value).unwrap().expose_secret(), "1234");
}

#[test]
fn test_conflict_is_an_outcome_not_an_error() {
    let dir = TempDir::new().unwrap();
    let store = StoreConfig::new(dir.path().join("secrets.json"));
    let cipher = FieldCipher::new(generate_key());
    let mut repo = Repository::load(store.clone()).unwrap();

    repo.upsert_entity("main", "GitHub", entity(&cipher, &[("password", "a")]), false)
        .unwrap();
    let on_disk = fs::read(&store.path).unwrap();

    let outcome = repo
        .upsert_entity("main", "GitHub", entity(&cipher, &[("password", "b")]), false)
        .unwrap();
    assert_eq!(outcome, Upsert::Conflict);
    assert_eq!(fs::read(&store.path).unwrap(), on_disk);
}

#[test]
fn test_legacy_store_is_readable_then_sealed() {
    let dir = TempDir::new().unwrap();
    let store = StoreConfig::new(dir.path().join("secrets.json"));
    fs::write(
        &store.path,
        r#"{"main": {"Old": {"password": "legacy", "website": "example.org"}}}"#,
    )
    .unwrap();
    let cipher = FieldCipher::new(generate_key());

    let mut repo = Repository::load(store.clone()).unwrap();
    let value = repo.get_attribute("main", "Old", "password").unwrap();
    assert_eq!(value, &AttributeValue::Plain("legacy".to_string()));
    assert_eq!(cipher.reveal(value).unwrap().expose_secret(), "legacy");

    assert_eq!(repo.seal_plaintext(&cipher).unwrap(), 2);
    let reloaded = Repository::load(store).unwrap();
    assert_eq!(reloaded.vault().plaintext_count(), 0);
    let value = reloaded.get_attribute("main", "Old", "website").unwrap();
    assert_eq!(cipher.reveal(value).unwrap().expose_secret(), "example.org");
}
