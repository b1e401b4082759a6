//! Entity factory: zero-valued allocation and cloning.
//!
//! New entities are shaped either by the type's schema or, for types
//! registered without one, after the most recent live entity of the type.
//! They start without an identity; one is assigned the first time they are
//! committed with a change.

use std::sync::Arc;

use shadowdb_foundation::{Error, ErrorKind, Handle, Record, Result};
use tracing::{debug, trace};

use crate::entity::{CommitCallback, Entity, Tracking};
use crate::store::Store;

/// Builds a zero-valued record shaped like `sample`.
///
/// Strings become empty and numbers zero. Values keep their kind, so
/// booleans become `false` rather than a numeric zero and nil stays nil.
/// Nested maps keep their keys with zeroed values and sequences become
/// empty.
#[must_use]
pub fn new_obj(sample: &Record) -> Record {
    sample.zero_like()
}

impl Store {
    /// Allocates a new, unidentified entity of the given type.
    ///
    /// The entity has `id` 0 and no collection slot until it is committed
    /// with a change. The type's init hook runs on it; pending work is
    /// queued for [`Store::take_pending`].
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` for unregistered types, and `NoSample` if the
    /// type has no schema and no live entity to use as a template.
    pub fn allocate(&mut self, type_name: &str) -> Result<Handle> {
        self.allocate_inner(type_name, None)
    }

    /// Allocates like [`Store::allocate`], binding a one-shot callback that
    /// runs on the entity's next commit.
    ///
    /// # Errors
    ///
    /// Same as [`Store::allocate`].
    pub fn allocate_with_hook<F>(&mut self, type_name: &str, on_commit: F) -> Result<Handle>
    where
        F: FnOnce(&Entity) + 'static,
    {
        self.allocate_inner(type_name, Some(Box::new(on_commit)))
    }

    /// Allocates like [`Store::allocate`], shaping the entity after `sample`
    /// instead of a live entity when the type has no schema.
    ///
    /// Lets records arriving from outside be allocated into a store that
    /// holds no entities of their type yet.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` for unregistered types.
    pub fn allocate_like(&mut self, type_name: &str, sample: &Record) -> Result<Handle> {
        let template = match self.types.entry(type_name)?.def.schema() {
            Some(schema) => schema.zero_record(),
            None => new_obj(sample),
        };
        let handle = self.spawn_allocated(type_name, template, None)?;
        debug!(type_name, %handle, "allocated entity from sample");
        Ok(handle)
    }

    /// Creates a copy of `base` as a new entity with its own identity.
    ///
    /// The base's fields are written over the fresh allocation, so fields
    /// the type's init hook set on the allocation survive unless the base
    /// carries them too. The copy is committed immediately and always counts
    /// as changed, so it leaves this call with a fresh identity.
    ///
    /// # Errors
    ///
    /// Returns `MissingMetadata` if `base` is not bound for tracking, or a
    /// handle error if it does not exist.
    pub fn clone_entity(&mut self, base: Handle) -> Result<Handle> {
        let source = self.arena.get(base)?;
        let type_name = source
            .type_name()
            .ok_or_else(|| Error::new(ErrorKind::MissingMetadata(base)))?
            .to_owned();
        let fields = source.fields.clone();

        let handle = self.spawn_allocated(&type_name, new_obj(&fields), None)?;
        let entity = self.open(handle)?;
        for (name, value) in fields.iter() {
            entity.fields.set(name, value.clone());
        }
        // Never inherit the base's identity
        entity.id = 0;
        self.commit_forced(handle)?;

        trace!(%base, %handle, type_name = %type_name, "cloned entity");
        Ok(handle)
    }

    fn allocate_inner(&mut self, type_name: &str, on_commit: Option<CommitCallback>) -> Result<Handle> {
        let template = self.template(type_name)?;
        let handle = self.spawn_allocated(type_name, template, on_commit)?;
        debug!(type_name, %handle, "allocated entity");
        Ok(handle)
    }

    /// Zero-valued record for a new entity of the type.
    fn template(&self, type_name: &str) -> Result<Record> {
        let entry = self.types.entry(type_name)?;
        if let Some(schema) = entry.def.schema() {
            return Ok(schema.zero_record());
        }

        // Nearest live entity from the end of the collection
        entry
            .collection
            .iter()
            .rev()
            .find_map(|(_, handle)| self.arena.get(handle).ok())
            .map(|sample| new_obj(&sample.fields))
            .ok_or_else(|| Error::no_sample(type_name))
    }

    fn spawn_allocated(
        &mut self,
        type_name: &str,
        fields: Record,
        on_commit: Option<CommitCallback>,
    ) -> Result<Handle> {
        let name: Arc<str> = self.types.name_of(type_name)?;
        let handle = self.arena.spawn(|h| {
            let mut entity = Entity::new(h, 0, fields);
            let mut tracking = Tracking::new(name);
            tracking.allocated = true;
            tracking.on_commit = on_commit;
            entity.tracking = Some(tracking);
            entity
        });

        if let Some(pending) = self.run_init_hook(handle)? {
            self.pending.push(pending);
        }
        Ok(handle)
    }
}
