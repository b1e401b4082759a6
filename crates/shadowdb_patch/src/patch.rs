//! The patch wire format.
//!
//! A patch is a list of entities or holes. Each present entry carries the
//! entity's `id`, its business fields inline, and a `_db` object naming its
//! type:
//!
//! ```json
//! [null, {"id": 1, "name": "axe", "qty": 0, "_db": {"type": "item"}}]
//! ```
//!
//! Snapshots and other tracking bookkeeping never appear in a patch.

use serde::{Deserialize, Serialize};
use shadowdb_foundation::Record;
use shadowdb_store::Entity;

/// An exported set of changed entities, replayable into another store.
///
/// Holes keep their positions so entry indices match the modified list
/// they were taken from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch {
    /// Entries in modified-list order; `None` is a hole.
    pub entries: Vec<Option<PatchEntry>>,
}

impl Patch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries, holes included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the patch has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over present entries with their positions.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PatchEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.as_ref().map(|e| (i, e)))
    }
}

impl FromIterator<Option<PatchEntry>> for Patch {
    fn from_iter<I: IntoIterator<Item = Option<PatchEntry>>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// One entity as it travels in a patch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchEntry {
    /// Identity within the type's collection.
    pub id: u64,
    /// Business fields, inlined next to `id`.
    #[serde(flatten)]
    pub fields: Record,
    /// Reduced metadata.
    #[serde(rename = "_db")]
    pub meta: PatchMeta,
}

/// The only tracking metadata a patch carries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchMeta {
    /// Registered type name.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl PatchEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(type_name: impl Into<String>, id: u64, fields: Record) -> Self {
        Self {
            id,
            fields,
            meta: PatchMeta {
                type_name: type_name.into(),
            },
        }
    }

    /// Projects a tracked entity. Returns `None` for entities with no
    /// tracking metadata, since their type is unknown.
    #[must_use]
    pub fn from_entity(entity: &Entity) -> Option<Self> {
        let type_name = entity.type_name()?;
        Some(Self::new(type_name, entity.id, entity.fields.clone()))
    }

    /// Returns the entry's type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.meta.type_name
    }
}
