//! Generational handles into a store's entity arena.

use std::fmt;

/// Reference to an entity slot with a generational index for stale
/// reference detection.
///
/// A handle is how callers hold on to an entity between operations. It is
/// distinct from the entity's `id`, which is the entity's identity within
/// its type's collection and is only assigned once the entity has been
/// committed with a change.
///
/// The generation counter increments when a slot is released and reused,
/// so a handle to a released entity can never alias its successor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Handle {
    /// Index into the arena.
    pub index: u32,
    /// Generation counter for stale reference detection.
    pub generation: u32,
}

impl Handle {
    /// Creates a new handle with the given index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}
