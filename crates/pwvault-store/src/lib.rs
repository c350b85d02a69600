//! Encrypted secrets store for pwvault.
//!
//! Holds the vault model (sections of entities of attributes), the
//! field-level encryption engine, the file-backed repository with its
//! backups, entity search and the password generator.

pub mod backup;
pub mod crypto;
pub mod error;
pub mod generator;
pub mod keysource;
pub mod model;
pub mod repository;
pub mod search;

pub use crypto::{Ciphertext, FieldCipher, Key};
pub use error::{Result, VaultError};
pub use generator::PasswordPolicy;
pub use model::{AttributeValue, Entity, Section, Vault};
pub use repository::{Repository, StoreConfig, Upsert};
pub use search::{find_entities, EntityMatch};
