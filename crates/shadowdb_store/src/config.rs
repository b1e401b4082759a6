//! Configuration for a store.

use shadowdb_foundation::Record;

use crate::entity::Snapshot;

/// How a commit decides whether an entity changed since it was opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiffMode {
    /// Compare each field of the live entity against the snapshot,
    /// recursing into nested maps. Fields that exist only on the snapshot
    /// (removed since open) are not inspected, so removing a field alone
    /// does not count as a change.
    #[default]
    Directional,
    /// Full structural equality. Removing a field counts as a change.
    Symmetric,
}

impl DiffMode {
    /// Returns true if the entity state matches the snapshot under this mode.
    #[must_use]
    pub fn unchanged(self, id: u64, fields: &Record, shadow: &Snapshot) -> bool {
        id == shadow.id
            && match self {
                Self::Directional => fields.covers(&shadow.fields),
                Self::Symmetric => *fields == shadow.fields,
            }
    }
}

/// Configuration for a store.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Change detection used by commit.
    pub diff_mode: DiffMode,

    /// Keep identity 0 free for "unassigned" by never handing it out to an
    /// allocation, even when the type's collection is empty.
    pub reserve_slot_zero: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            diff_mode: DiffMode::Directional,
            reserve_slot_zero: true,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration that treats removed fields as changes.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            diff_mode: DiffMode::Symmetric,
            ..Self::default()
        }
    }

    /// Builder method to set the diff mode.
    #[must_use]
    pub fn with_diff_mode(mut self, diff_mode: DiffMode) -> Self {
        self.diff_mode = diff_mode;
        self
    }

    /// Builder method to set slot-zero reservation.
    #[must_use]
    pub fn with_reserve_slot_zero(mut self, reserve: bool) -> Self {
        self.reserve_slot_zero = reserve;
        self
    }
}
