//! Entities and their tracking metadata.

use std::fmt;
use std::sync::Arc;

use shadowdb_foundation::{Handle, Record};

/// One-shot callback bound to an entity at allocation, invoked on its next
/// commit and then dropped.
pub type CommitCallback = Box<dyn FnOnce(&Entity)>;

/// Pre-edit copy of an entity, taken when it is opened.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// The entity's id at open time.
    pub id: u64,
    /// The entity's business fields at open time.
    pub fields: Record,
}

/// Bookkeeping the store keeps for every entity that has passed through it.
///
/// Kept apart from the business fields so it never leaks into diffs or
/// exported patches.
pub(crate) struct Tracking {
    pub(crate) type_name: Arc<str>,
    pub(crate) mod_index: Option<usize>,
    pub(crate) allocated: bool,
    /// Whether the entity held its collection slot when it was opened.
    pub(crate) held_slot: bool,
    pub(crate) shadow: Option<Snapshot>,
    pub(crate) on_commit: Option<CommitCallback>,
}

impl Tracking {
    pub(crate) fn new(type_name: Arc<str>) -> Self {
        Self {
            type_name,
            mod_index: None,
            allocated: false,
            held_slot: false,
            shadow: None,
            on_commit: None,
        }
    }
}

/// A record owned by the store.
///
/// `id` is the entity's identity within its type's collection; 0 means no
/// identity has been assigned. `fields` may be edited freely through
/// [`Store::get_mut`](crate::Store::get_mut) or the reference returned by
/// [`Store::open`](crate::Store::open).
pub struct Entity {
    /// Identity within the type's collection (0 = unassigned).
    pub id: u64,
    /// Application-defined business fields.
    pub fields: Record,
    handle: Handle,
    pub(crate) tracking: Option<Tracking>,
}

impl Entity {
    pub(crate) fn new(handle: Handle, id: u64, fields: Record) -> Self {
        Self {
            id,
            fields,
            handle,
            tracking: None,
        }
    }

    /// Returns the handle this entity lives at.
    #[must_use]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Returns true if tracking metadata has been bound.
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        self.tracking.is_some()
    }

    /// Returns the entity's type name, if tracking metadata is bound.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.tracking.as_ref().map(|t| &*t.type_name)
    }

    /// Returns true if the entity is open (holds a shadow snapshot).
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.shadow().is_some()
    }

    /// Returns true if the entity was created by the factory rather than
    /// placed into the store directly.
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.tracking.as_ref().is_some_and(|t| t.allocated)
    }

    /// Returns the entity's position in the modified list while open.
    #[must_use]
    pub fn mod_index(&self) -> Option<usize> {
        self.tracking.as_ref().and_then(|t| t.mod_index)
    }

    /// Returns the shadow snapshot while open.
    #[must_use]
    pub fn shadow(&self) -> Option<&Snapshot> {
        self.tracking.as_ref().and_then(|t| t.shadow.as_ref())
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("handle", &self.handle)
            .field("type", &self.type_name())
            .field("id", &self.id)
            .field("fields", &self.fields)
            .field("open", &self.is_open())
            .field("allocated", &self.is_allocated())
            .finish()
    }
}
