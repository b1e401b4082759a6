//! Shadow-copy change tracking.
//!
//! Opening an entity snapshots its fields and appends it to the modified
//! list. Committing compares the live entity against that snapshot: a
//! changed new allocation receives its identity, every commit observer is
//! notified, and an entity that turns out unchanged is reverted to its
//! pre-open bookkeeping, leaving no trace in the modified list.

use shadowdb_foundation::{Error, ErrorKind, FieldPath, Handle, Record, Result, Value};
use tracing::{debug, trace};

use crate::entity::{Entity, Snapshot};
use crate::store::Store;

impl Store {
    /// Opens an entity for tracked editing and returns it.
    ///
    /// Snapshots the entity's fields and appends it to the modified list.
    /// Opening an entity that is already open does nothing.
    ///
    /// # Errors
    ///
    /// Returns `MissingMetadata` if the entity is not bound for tracking.
    pub fn open(&mut self, handle: Handle) -> Result<&mut Entity> {
        let entity = self.arena.get_mut(handle)?;
        let tracking = entity
            .tracking
            .as_mut()
            .ok_or_else(|| Error::new(ErrorKind::MissingMetadata(handle)))?;

        if tracking.shadow.is_none() {
            tracking.held_slot =
                self.types.collection(&tracking.type_name)?.get(entity.id) == Some(handle);
            tracking.shadow = Some(Snapshot {
                id: entity.id,
                fields: entity.fields.clone(),
            });
            tracking.mod_index = Some(self.modified.len());
            self.modified.push(Some(handle));
            trace!(%handle, mod_index = self.modified.len() - 1, "opened entity");
        }

        Ok(entity)
    }

    /// Commits an open entity and reports whether it changed since it was
    /// opened.
    ///
    /// - A changed allocation without an identity is appended to its type's
    ///   collection and takes the slot index as its `id`.
    /// - Every commit observer is invoked, changed or not.
    /// - An unchanged entity is closed: its modified-list slot becomes a
    ///   hole and its snapshot is dropped. An unchanged allocation that
    ///   had no identity stays without one and holds no collection slot.
    /// - The entity's one-shot callback, if any, runs last and is dropped.
    ///
    /// A changed entity stays open, so later commits keep comparing
    /// against the original snapshot.
    ///
    /// # Errors
    ///
    /// Returns `MissingMetadata`, `MissingModIndex` or `MissingOriginal` if
    /// the entity was not bound and opened. Nothing is modified and no
    /// observer runs in that case.
    pub fn commit(&mut self, handle: Handle) -> Result<bool> {
        self.commit_inner(handle, false)
    }

    /// Commits an entity treating it as changed regardless of its fields.
    pub(crate) fn commit_forced(&mut self, handle: Handle) -> Result<bool> {
        self.commit_inner(handle, true)
    }

    fn commit_inner(&mut self, handle: Handle, force: bool) -> Result<bool> {
        let diff_mode = self.config.diff_mode;
        let reserve_zero = self.config.reserve_slot_zero;

        let entity = self.arena.get_mut(handle)?;
        let tracking = entity
            .tracking
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::MissingMetadata(handle)))?;
        let mod_index = tracking
            .mod_index
            .ok_or_else(|| Error::new(ErrorKind::MissingModIndex(handle)))?;
        let shadow = tracking
            .shadow
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::MissingOriginal(handle)))?;

        let changed = force || !diff_mode.unchanged(entity.id, &entity.fields, shadow);
        let allocated = tracking.allocated;
        let held_slot = tracking.held_slot;
        let type_name = tracking.type_name.clone();

        if changed && allocated && entity.id == 0 {
            let collection = &mut self.types.entry_mut(&type_name)?.collection;
            // Already in slot 0 if it was reindexed there
            if collection.get(0) != Some(handle) {
                entity.id = collection.append(handle, reserve_zero);
                debug!(type_name = %type_name, id = entity.id, %handle, "assigned identity");
            }
        }

        self.hooks.fire(entity);

        let Some(tracking) = entity.tracking.as_mut() else {
            return Err(Error::new(ErrorKind::MissingMetadata(handle)));
        };

        if !changed {
            if let Some(slot) = self.modified.get_mut(mod_index) {
                *slot = None;
            }
            tracking.shadow = None;
            tracking.mod_index = None;

            // Unchanged implies the id is the one seen at open time
            if allocated && entity.id == 0 && !held_slot {
                self.types.entry_mut(&type_name)?.collection.clear(0, handle);
            }
            trace!(%handle, "commit found no change, entity closed");
        } else {
            trace!(%handle, id = entity.id, "commit recorded change");
        }

        if let Some(on_commit) = tracking.on_commit.take() {
            on_commit(entity);
        }

        Ok(changed)
    }

    /// Overrides the snapshot value at `path` without touching the live
    /// entity, then commits so observers see the adjustment.
    ///
    /// Use this when a runtime-only field is added to an entity after it was
    /// opened, so that the field does not count as a user edit. If the
    /// entity is not open this does nothing: the snapshot taken on the next
    /// open will copy the live value as is.
    ///
    /// Missing intermediate containers are created on the snapshot side,
    /// shaped after the live entity.
    ///
    /// # Errors
    ///
    /// Returns `MissingMetadata` if the entity is not bound for tracking,
    /// `UnreachableField` if an intermediate step is missing on the live
    /// entity, and `InvalidField` if the structure does not match the path.
    pub fn set_org_field(
        &mut self,
        handle: Handle,
        path: impl Into<FieldPath>,
        value: impl Into<Value>,
    ) -> Result<()> {
        let path = path.into();
        let entity = self.arena.get_mut(handle)?;
        let tracking = entity
            .tracking
            .as_mut()
            .ok_or_else(|| Error::new(ErrorKind::MissingMetadata(handle)))?;

        let Some(shadow) = tracking.shadow.as_mut() else {
            trace!(%handle, %path, "entity not open, nothing to seed");
            return Ok(());
        };

        let seeded = shadow.fields.to_value().with_path_shaped_by(
            &entity.fields.to_value(),
            &path,
            value.into(),
        )?;
        shadow.fields = Record::from_value(&seeded).ok_or_else(|| Error::invalid_field(&path))?;
        trace!(%handle, %path, "seeded original field");

        self.open(handle)?;
        self.commit(handle)?;
        Ok(())
    }

    /// Returns true if the entity is open.
    ///
    /// # Errors
    ///
    /// Returns a handle error if the entity does not exist.
    pub fn is_open(&self, handle: Handle) -> Result<bool> {
        Ok(self.arena.get(handle)?.is_open())
    }
}
