//! In-memory vault model.
//!
//! The vault is a three-level tree, `section → entity → attribute`, stored on
//! disk as nested JSON objects whose leaves are strings. Insertion order is
//! kept so listings and search results come out in document order, while
//! equality ignores order.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::Ciphertext;
use crate::error::{Result, VaultError};

/// A stored attribute value.
///
/// Every value written by pwvault is [`AttributeValue::Encrypted`]. `Plain`
/// only appears when a store written by an older tool is loaded.
#[derive(Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Encrypted(Ciphertext),
    Plain(String),
}

impl AttributeValue {
    /// Interpret a string read from the store.
    pub fn from_stored(stored: String) -> Self {
        match Ciphertext::from_token(stored) {
            Ok(ciphertext) => Self::Encrypted(ciphertext),
            Err(text) => Self::Plain(text),
        }
    }

    /// The string written to the store.
    pub fn as_stored(&self) -> &str {
        match self {
            Self::Encrypted(ciphertext) => ciphertext.as_str(),
            Self::Plain(text) => text,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted(_))
    }
}

impl fmt::Debug for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encrypted(ciphertext) => write!(f, "Encrypted({ciphertext:?})"),
            Self::Plain(_) => f.write_str("Plain([REDACTED])"),
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_stored())
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let stored = String::deserialize(deserializer)?;
        Ok(Self::from_stored(stored))
    }
}

/// Attribute every entity is created with.
pub const PASSWORD_ATTRIBUTE: &str = "password";

/// Reject empty (or whitespace-only) section, entity and attribute names.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(VaultError::InvalidName(format!("{kind} name must not be empty")));
    }
    Ok(())
}

/// The attribute map of one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity {
    attributes: IndexMap<String, AttributeValue>,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an attribute, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) -> Option<AttributeValue> {
        self.attributes.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attribute names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut AttributeValue> {
        self.attributes.values_mut()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl FromIterator<(String, AttributeValue)> for Entity {
    fn from_iter<I: IntoIterator<Item = (String, AttributeValue)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

/// A named group of entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Section {
    entities: IndexMap<String, Entity>,
}

impl Section {
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// Insert or replace an entity, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, entity: Entity) -> Option<Entity> {
        self.entities.insert(name.into(), entity)
    }

    /// Remove an entity, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Entity> {
        self.entities.shift_remove(name)
    }

    /// Entity names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// The whole secrets tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vault {
    sections: IndexMap<String, Section>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sections in insertion order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn section(&self, name: &str) -> Result<&Section> {
        self.sections
            .get(name)
            .ok_or_else(|| VaultError::SectionNotFound(name.to_string()))
    }

    pub fn section_mut(&mut self, name: &str) -> Result<&mut Section> {
        self.sections
            .get_mut(name)
            .ok_or_else(|| VaultError::SectionNotFound(name.to_string()))
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Get a section, creating it empty if absent.
    pub fn ensure_section(&mut self, name: &str) -> &mut Section {
        self.sections.entry(name.to_string()).or_default()
    }

    /// Remove a section and everything in it, keeping the order of the others.
    pub fn remove_section(&mut self, name: &str) -> Option<Section> {
        self.sections.shift_remove(name)
    }

    pub fn entity(&self, section: &str, entity: &str) -> Result<&Entity> {
        self.section(section)?
            .get(entity)
            .ok_or_else(|| VaultError::EntityNotFound {
                section: section.to_string(),
                entity: entity.to_string(),
            })
    }

    pub fn entity_mut(&mut self, section: &str, entity: &str) -> Result<&mut Entity> {
        self.section_mut(section)?
            .get_mut(entity)
            .ok_or_else(|| VaultError::EntityNotFound {
                section: section.to_string(),
                entity: entity.to_string(),
            })
    }

    pub fn contains_entity(&self, section: &str, entity: &str) -> bool {
        self.sections
            .get(section)
            .map_or(false, |s| s.contains(entity))
    }

    /// Every attribute value in the vault, mutably.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut AttributeValue> {
        self.sections
            .values_mut()
            .flat_map(Section::entities_mut)
            .flat_map(Entity::values_mut)
    }

    /// Number of attribute values still stored as plaintext.
    pub fn plaintext_count(&self) -> usize {
        self.sections
            .values()
            .flat_map(|s| s.entities.values())
            .flat_map(|e| e.attributes.values())
            .filter(|v| !v.is_encrypted())
            .count()
    }

    /// Check the name invariants on a freshly deserialized vault.
    pub fn validate(&self) -> Result<()> {
        for (section_name, section) in &self.sections {
            validate_name("section", section_name)?;
            for (entity_name, entity) in &section.entities {
                validate_name("entity", entity_name)?;
                for attribute in entity.attributes.keys() {
                    validate_name("attribute", attribute)?;
                }
            }
        }
        Ok(())
    }
}
