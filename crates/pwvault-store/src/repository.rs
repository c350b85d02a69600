//! The secrets repository.
//!
//! [`Repository`] owns the in-memory [`Vault`] and its file. The store is a
//! single JSON document, rewritten in full after every mutation. Each
//! mutation runs against a working copy. The current vault is backed up,
//! the copy is written, and only then does it replace the in-memory vault.
//! A failing precondition or write leaves both the memory and the file as
//! they were.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pwvault_core::{paths, Config};
use tracing::{debug, info, warn};

use crate::backup;
use crate::crypto::FieldCipher;
use crate::error::{Result, VaultError};
use crate::model::{validate_name, AttributeValue, Entity, Vault, PASSWORD_ATTRIBUTE};
use crate::search::{self, EntityMatch};

/// Where the store and its backups live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub backup_dir: PathBuf,
    pub max_backups: Option<usize>,
}

impl StoreConfig {
    /// Store at `path` with backups in a `.backups` sibling directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let backup_dir = paths::backup_dir_for(&path);
        Self {
            path,
            backup_dir,
            max_backups: None,
        }
    }

    /// Resolve locations and retention from the application config.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            path: config.vault_path()?,
            backup_dir: config.backup_dir()?,
            max_backups: config.vault.max_backups,
        })
    }

    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = Some(max_backups);
        self
    }
}

/// Outcome of [`Repository::upsert_entity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The entity did not exist and was created.
    Created,
    /// An existing entity was replaced wholesale.
    Replaced,
    /// The entity exists and overwriting was not allowed; nothing changed.
    Conflict,
}

/// The loaded vault plus the file it came from.
#[derive(Debug)]
pub struct Repository {
    config: StoreConfig,
    vault: Vault,
}

impl Repository {
    /// Load the store. A missing file is an empty vault.
    pub fn load(config: StoreConfig) -> Result<Self> {
        let vault = match fs::read(&config.path) {
            Ok(bytes) => parse_store(&config.path, &bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %config.path.display(), "no secrets store yet, starting empty");
                Vault::new()
            }
            Err(e) => return Err(e.into()),
        };

        debug!(
            path = %config.path.display(),
            sections = vault.sections().count(),
            "loaded secrets store"
        );
        Ok(Self { config, vault })
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn get_entity(&self, section: &str, entity: &str) -> Result<&Entity> {
        self.vault.entity(section, entity)
    }

    pub fn get_attribute(&self, section: &str, entity: &str, attribute: &str) -> Result<&AttributeValue> {
        self.get_entity(section, entity)?
            .get(attribute)
            .ok_or_else(|| VaultError::AttributeNotFound {
                entity: entity.to_string(),
                attribute: attribute.to_string(),
            })
    }

    pub fn list_sections(&self) -> Vec<&str> {
        self.vault.section_names().collect()
    }

    pub fn list_entities(&self, section: &str) -> Result<Vec<&str>> {
        Ok(self.vault.section(section)?.names().collect())
    }

    /// Entities whose name contains `term`, ignoring case.
    pub fn find_entities<'a>(&'a self, term: &str) -> impl Iterator<Item = EntityMatch<'a>> + 'a {
        search::find_entities(&self.vault, term)
    }

    /// Create an empty section. Returns `false` if it already exists, in
    /// which case nothing is written.
    pub fn create_section(&mut self, name: &str) -> Result<bool> {
        validate_name("section", name)?;
        if self.vault.contains_section(name) {
            warn!(section = name, "section already exists");
            return Ok(false);
        }

        self.commit(|vault| {
            vault.ensure_section(name);
            Ok(())
        })?;
        info!(section = name, "created section");
        Ok(true)
    }

    /// Remove a section and every entity in it.
    pub fn remove_section(&mut self, name: &str) -> Result<()> {
        self.commit(|vault| {
            vault
                .remove_section(name)
                .map(drop)
                .ok_or_else(|| VaultError::SectionNotFound(name.to_string()))
        })?;
        info!(section = name, "removed section");
        Ok(())
    }

    /// Create or replace an entity, creating the section if needed. The
    /// attributes must include `"password"`.
    pub fn upsert_entity(
        &mut self,
        section: &str,
        name: &str,
        attributes: Entity,
        overwrite: bool,
    ) -> Result<Upsert> {
        validate_name("section", section)?;
        validate_name("entity", name)?;
        for attribute in attributes.names() {
            validate_name("attribute", attribute)?;
        }
        if !attributes.contains(PASSWORD_ATTRIBUTE) {
            return Err(VaultError::MissingPassword(name.to_string()));
        }

        let exists = self.vault.contains_entity(section, name);
        if exists && !overwrite {
            debug!(section, entity = name, "entity exists, not overwriting");
            return Ok(Upsert::Conflict);
        }

        self.commit(|vault| {
            vault.ensure_section(section).insert(name, attributes);
            Ok(())
        })?;

        debug!(section, entity = name, replaced = exists, "stored entity");
        Ok(if exists { Upsert::Replaced } else { Upsert::Created })
    }

    /// Set one attribute on an existing entity.
    pub fn update_attribute(
        &mut self,
        section: &str,
        entity: &str,
        attribute: &str,
        value: AttributeValue,
    ) -> Result<()> {
        validate_name("attribute", attribute)?;
        self.commit(|vault| {
            vault.entity_mut(section, entity)?.insert(attribute, value);
            Ok(())
        })?;
        debug!(section, entity, attribute, "updated attribute");
        Ok(())
    }

    pub fn remove_entity(&mut self, section: &str, entity: &str) -> Result<()> {
        self.commit(|vault| {
            vault
                .section_mut(section)?
                .remove(entity)
                .map(drop)
                .ok_or_else(|| VaultError::EntityNotFound {
                    section: section.to_string(),
                    entity: entity.to_string(),
                })
        })?;
        debug!(section, entity, "removed entity");
        Ok(())
    }

    /// Encrypt every plaintext value left by older tools. Returns how many
    /// values were sealed; writes nothing when there are none.
    pub fn seal_plaintext(&mut self, cipher: &FieldCipher) -> Result<usize> {
        if self.vault.plaintext_count() == 0 {
            debug!("no plaintext values to seal");
            return Ok(0);
        }

        let sealed = self.commit(|vault| {
            let mut count = 0;
            for value in vault.values_mut() {
                if let AttributeValue::Plain(text) = value {
                    let encrypted = cipher.seal(text)?;
                    *value = encrypted;
                    count += 1;
                }
            }
            Ok(count)
        })?;
        info!(count = sealed, "sealed plaintext values");
        Ok(sealed)
    }

    /// Snapshot the current vault into the backup directory, then apply
    /// the retention limit.
    pub fn backup(&self) -> Result<PathBuf> {
        let path = backup::write_backup(&self.config.backup_dir, &self.vault)?;
        if let Some(keep) = self.config.max_backups {
            backup::prune_backups(&self.config.backup_dir, keep)?;
        }
        Ok(path)
    }

    /// Write the current vault to the store file.
    pub fn save(&self) -> Result<()> {
        write_store(&self.config.path, &self.vault)
    }

    fn commit<T>(&mut self, mutate: impl FnOnce(&mut Vault) -> Result<T>) -> Result<T> {
        let mut working = self.vault.clone();
        let outcome = mutate(&mut working)?;

        self.backup()?;
        write_store(&self.config.path, &working)?;
        self.vault = working;
        Ok(outcome)
    }
}

fn parse_store(path: &Path, bytes: &[u8]) -> Result<Vault> {
    // serde_json's own message can quote store content, so only the
    // category and position are reported.
    let vault: Vault = serde_json::from_slice(bytes).map_err(|e| VaultError::StoreCorrupt {
        path: path.to_path_buf(),
        reason: format!(
            "{:?} error at line {} column {}",
            e.classify(),
            e.line(),
            e.column()
        ),
    })?;

    vault.validate().map_err(|e| VaultError::StoreCorrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(vault)
}

fn write_store(path: &Path, vault: &Vault) -> Result<()> {
    let json = serde_json::to_vec_pretty(vault)?;
    backup::write_atomic(path, &json)?;
    debug!(path = %path.display(), "wrote secrets store");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_key;
    use tempfile::TempDir;

    fn store_in(tmp: &TempDir) -> StoreConfig {
        StoreConfig::new(tmp.path().join("secrets.json"))
    }

    fn entity(cipher: &FieldCipher, password: &str) -> Entity {
        let mut entity = Entity::new();
        entity.insert("password", cipher.seal(password).unwrap());
        entity.insert("username", cipher.seal("octocat").unwrap());
        entity
    }

    fn backups(repo: &Repository) -> Vec<PathBuf> {
        backup::list_backups(&repo.config().backup_dir).unwrap()
    }

    fn read_backup(path: &Path) -> Vault {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn test_missing_store_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::load(store_in(&tmp)).unwrap();
        assert!(repo.list_sections().is_empty());
        assert!(!repo.config().path.exists());
    }

    #[test]
    fn test_save_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let cipher = FieldCipher::new(generate_key());

        let mut repo = Repository::load(store_in(&tmp)).unwrap();
        repo.upsert_entity("main", "GitHub", entity(&cipher, "pw1"), false)
            .unwrap();
        repo.create_section("dev").unwrap();

        let reloaded = Repository::load(store_in(&tmp)).unwrap();
        assert_eq!(reloaded.vault(), repo.vault());
        assert_eq!(reloaded.list_sections(), vec!["main", "dev"]);

        let value = reloaded.get_attribute("main", "GitHub", "password").unwrap();
        assert_eq!(cipher.reveal(value).unwrap().expose_secret(), "pw1");
    }

    #[test]
    fn test_backup_holds_pre_mutation_vault() {
        let tmp = TempDir::new().unwrap();
        let cipher = FieldCipher::new(generate_key());

        let mut repo = Repository::load(store_in(&tmp)).unwrap();
        repo.upsert_entity("main", "GitHub", entity(&cipher, "pw1"), false)
            .unwrap();
        let before = repo.vault().clone();

        repo.remove_entity("main", "GitHub").unwrap();

        let newest = backups(&repo).pop().unwrap();
        assert_eq!(read_backup(&newest), before);
        assert!(repo.list_entities("main").unwrap().is_empty());
    }

    #[test]
    fn test_create_section_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let mut repo = Repository::load(store_in(&tmp)).unwrap();

        assert!(repo.create_section("dev").unwrap());
        let backups_after_first = backups(&repo).len();
        assert!(!repo.create_section("dev").unwrap());

        assert_eq!(repo.list_sections(), vec!["dev"]);
        assert_eq!(backups(&repo).len(), backups_after_first);
    }

    #[test]
    fn test_upsert_conflict_leaves_entity_unchanged() {
        let tmp = TempDir::new().unwrap();
        let cipher = FieldCipher::new(generate_key());
        let mut repo = Repository::load(store_in(&tmp)).unwrap();

        let outcome = repo
            .upsert_entity("main", "GitHub", entity(&cipher, "original"), false)
            .unwrap();
        assert_eq!(outcome, Upsert::Created);
        let before = repo.vault().clone();
        let backup_count = backups(&repo).len();

        let outcome = repo
            .upsert_entity("main", "GitHub", entity(&cipher, "replacement"), false)
            .unwrap();
        assert_eq!(outcome, Upsert::Conflict);
        assert_eq!(repo.vault(), &before);
        assert_eq!(backups(&repo).len(), backup_count);

        let outcome = repo
            .upsert_entity("main", "GitHub", entity(&cipher, "replacement"), true)
            .unwrap();
        assert_eq!(outcome, Upsert::Replaced);
        let value = repo.get_attribute("main", "GitHub", "password").unwrap();
        assert_eq!(cipher.reveal(value).unwrap().expose_secret(), "replacement");
    }

    #[test]
    fn test_missing_entity_changes_nothing() {
        let tmp = TempDir::new().unwrap();
        let cipher = FieldCipher::new(generate_key());
        let mut repo = Repository::load(store_in(&tmp)).unwrap();
        repo.create_section("main").unwrap();
        let before = repo.vault().clone();
        let backup_count = backups(&repo).len();

        assert!(matches!(
            repo.get_entity("main", "DoesNotExist"),
            Err(VaultError::EntityNotFound { .. })
        ));
        let err = repo
            .update_attribute("main", "DoesNotExist", "username", cipher.seal("x").unwrap())
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.remove_entity("main", "DoesNotExist").unwrap_err().is_not_found());
        assert!(repo.remove_section("nope").unwrap_err().is_not_found());

        assert_eq!(repo.vault(), &before);
        assert_eq!(backups(&repo).len(), backup_count);
        assert_eq!(Repository::load(store_in(&tmp)).unwrap().vault(), &before);
    }

    #[test]
    fn test_update_attribute_merges() {
        let tmp = TempDir::new().unwrap();
        let cipher = FieldCipher::new(generate_key());
        let mut repo = Repository::load(store_in(&tmp)).unwrap();
        repo.upsert_entity("main", "GitHub", entity(&cipher, "pw1"), false)
            .unwrap();

        repo.update_attribute("main", "GitHub", "website", cipher.seal("github.com").unwrap())
            .unwrap();

        let names: Vec<&str> = repo.get_entity("main", "GitHub").unwrap().names().collect();
        assert_eq!(names, vec!["password", "username", "website"]);
        assert!(matches!(
            repo.get_attribute("main", "GitHub", "totp"),
            Err(VaultError::AttributeNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_names_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut repo = Repository::load(store_in(&tmp)).unwrap();

        assert!(matches!(repo.create_section("  "), Err(VaultError::InvalidName(_))));
        assert!(matches!(
            repo.upsert_entity("main", "", Entity::new(), false),
            Err(VaultError::InvalidName(_))
        ));
        assert!(!repo.config().path.exists());
    }

    #[test]
    fn test_entity_without_password_rejected() {
        let tmp = TempDir::new().unwrap();
        let cipher = FieldCipher::new(generate_key());
        let mut repo = Repository::load(store_in(&tmp)).unwrap();

        let err = repo
            .upsert_entity("main", "GitHub", Entity::new(), false)
            .unwrap_err();
        assert!(matches!(err, VaultError::MissingPassword(ref name) if name == "GitHub"));

        let mut username_only = Entity::new();
        username_only.insert("username", cipher.seal("octocat").unwrap());
        assert!(matches!(
            repo.upsert_entity("main", "GitHub", username_only, true),
            Err(VaultError::MissingPassword(_))
        ));

        assert!(repo.list_sections().is_empty());
        assert!(!repo.config().path.exists());
        assert!(backups(&repo).is_empty());
    }

    #[test]
    fn test_corrupt_store_does_not_leak_content() {
        let tmp = TempDir::new().unwrap();
        let config = store_in(&tmp);
        fs::write(&config.path, r#"{"main": {"GitHub": {"password": 12345678}}}"#).unwrap();

        let err = Repository::load(config).unwrap_err();
        assert!(matches!(err, VaultError::StoreCorrupt { .. }));
        assert!(!err.to_string().contains("12345678"), "{err}");
    }

    #[test]
    fn test_truncated_store_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let config = store_in(&tmp);
        fs::write(&config.path, r#"{"main": {"#).unwrap();
        assert!(matches!(
            Repository::load(config),
            Err(VaultError::StoreCorrupt { .. })
        ));
    }

    #[test]
    fn test_max_backups_prunes_oldest() {
        let tmp = TempDir::new().unwrap();
        let mut repo = Repository::load(store_in(&tmp).with_max_backups(2)).unwrap();

        for name in ["a", "b", "c", "d"] {
            repo.create_section(name).unwrap();
        }

        let kept = backups(&repo);
        assert_eq!(kept.len(), 2);
        let newest = read_backup(kept.last().unwrap());
        let names: Vec<&str> = newest.section_names().collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_seal_plaintext() {
        let tmp = TempDir::new().unwrap();
        let config = store_in(&tmp);
        fs::write(
            &config.path,
            r#"{"main": {"GitHub": {"password": "legacy", "username": "octocat"}}}"#,
        )
        .unwrap();
        let cipher = FieldCipher::new(generate_key());

        let mut repo = Repository::load(config).unwrap();
        assert_eq!(repo.vault().plaintext_count(), 2);
        assert_eq!(repo.seal_plaintext(&cipher).unwrap(), 2);
        assert_eq!(repo.vault().plaintext_count(), 0);

        let value = repo.get_attribute("main", "GitHub", "password").unwrap();
        assert!(value.is_encrypted());
        assert_eq!(cipher.reveal(value).unwrap().expose_secret(), "legacy");

        let backup_count = backups(&repo).len();
        assert_eq!(repo.seal_plaintext(&cipher).unwrap(), 0);
        assert_eq!(backups(&repo).len(), backup_count);
    }

    #[test]
    fn test_find_through_repository() {
        let tmp = TempDir::new().unwrap();
        let mut repo = Repository::load(store_in(&tmp)).unwrap();
        let cipher = FieldCipher::new(generate_key());
        repo.upsert_entity("main", "GitHub", entity(&cipher, "a"), false).unwrap();
        repo.upsert_entity("dev", "Gitea", entity(&cipher, "b"), false).unwrap();

        let found: Vec<(&str, &str)> = repo
            .find_entities("git")
            .map(|m| (m.section, m.entity))
            .collect();
        assert_eq!(found, vec![("main", "GitHub"), ("dev", "Gitea")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_store_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let mut repo = Repository::load(store_in(&tmp)).unwrap();
        repo.create_section("main").unwrap();

        let mode = fs::metadata(&repo.config().path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "store file should have 0600 permissions");
    }
}
