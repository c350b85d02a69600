//! Case-insensitive entity search.

use crate::model::Vault;

/// One search hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMatch<'a> {
    pub section: &'a str,
    pub entity: &'a str,
}

/// Lazily scan every section for entities whose name contains `term`,
/// ignoring case.
///
/// Hits come out in section order, then entity order. The iterator is
/// single-pass; call again to re-scan. No hits is an empty iterator, not an
/// error.
pub fn find_entities<'a>(vault: &'a Vault, term: &str) -> impl Iterator<Item = EntityMatch<'a>> + 'a {
    let needle = term.to_lowercase();
    vault.sections().flat_map(move |(section, entities)| {
        let needle = needle.clone();
        entities
            .names()
            .filter(move |entity| entity.to_lowercase().contains(&needle))
            .map(move |entity| EntityMatch { section, entity })
    })
}
