//! The store context.
//!
//! A `Store` owns everything the tracker works with: the entity arena, the
//! type registry with its collections, the modified list, the commit hooks,
//! and the queue of pending init work. Independent stores share nothing.

use shadowdb_foundation::{Error, ErrorKind, Handle, Record, Result};
use tracing::{debug, warn};

use crate::arena::Arena;
use crate::config::StoreConfig;
use crate::entity::{Entity, Tracking};
use crate::hooks::CommitHooks;
use crate::registry::{Collection, PendingInit, TypeDef, TypeRegistry};

/// In-memory entity store with opt-in change tracking.
pub struct Store {
    pub(crate) config: StoreConfig,
    pub(crate) arena: Arena,
    pub(crate) types: TypeRegistry,
    /// Open entities in the order they were opened. Reverted entries become
    /// holes so indices stay stable.
    pub(crate) modified: Vec<Option<Handle>>,
    pub(crate) hooks: CommitHooks,
    pub(crate) pending: Vec<PendingInit>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Creates an empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store with the given configuration.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            arena: Arena::new(),
            types: TypeRegistry::new(),
            modified: Vec::new(),
            hooks: CommitHooks::new(),
            pending: Vec::new(),
        }
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // =========================================================================
    // Types and Hooks
    // =========================================================================

    /// Registers an entity type.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateType` if the name is already registered.
    pub fn register_type(&mut self, def: TypeDef) -> Result<()> {
        let name = def.name().to_owned();
        self.types.register(def)?;
        debug!(type_name = %name, "registered entity type");
        Ok(())
    }

    /// Returns the type registry.
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Registers an observer called on every commit.
    pub fn on_commit<F>(&mut self, hook: F)
    where
        F: FnMut(&Entity) + 'static,
    {
        self.hooks.register(hook);
    }

    /// Returns the commit observers.
    #[must_use]
    pub fn hooks(&self) -> &CommitHooks {
        &self.hooks
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Places a record at the next slot of its type's collection without
    /// binding tracking metadata. The entity's `id` is its slot.
    ///
    /// The entity cannot be opened until [`Store::init_entity`] binds it.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if the type was never registered.
    pub fn push(&mut self, type_name: &str, fields: Record) -> Result<Handle> {
        let entry = self.types.entry_mut(type_name)?;
        let id = entry.collection.len() as u64;
        let handle = self.arena.spawn(|h| Entity::new(h, id, fields));
        entry.collection.place(id, handle)?;
        Ok(handle)
    }

    /// Binds tracking metadata to an entity and runs its type's init hook.
    ///
    /// Metadata that is already bound is left as is; the hook still runs.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if the type was never registered, or a handle
    /// error if the entity does not exist.
    pub fn init_entity(&mut self, type_name: &str, handle: Handle) -> Result<Option<PendingInit>> {
        let name = self.types.name_of(type_name)?;
        let entity = self.arena.get_mut(handle)?;
        if entity.tracking.is_none() {
            entity.tracking = Some(Tracking::new(name));
        }
        self.run_init_hook(handle)
    }

    /// Places a record like [`Store::push`] and binds it for tracking.
    ///
    /// Pending work from the init hook is queued; see [`Store::take_pending`].
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if the type was never registered.
    pub fn insert(&mut self, type_name: &str, fields: Record) -> Result<Handle> {
        let handle = self.push(type_name, fields)?;
        if let Some(pending) = self.init_entity(type_name, handle)? {
            self.pending.push(pending);
        }
        Ok(handle)
    }

    /// Runs the init hook of the entity's type against it again.
    ///
    /// # Errors
    ///
    /// Returns `MissingMetadata` if the entity is not bound for tracking.
    pub fn run_init_hook(&mut self, handle: Handle) -> Result<Option<PendingInit>> {
        let entity = self.arena.get_mut(handle)?;
        let tracking = entity
            .tracking
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::MissingMetadata(handle)))?;
        let def = &self.types.entry(&tracking.type_name)?.def;
        Ok(def.init(entity))
    }

    /// Puts the entity into its collection at the slot matching its `id`.
    ///
    /// Used after an entity's `id` was overwritten from outside. The slot
    /// the entity occupied before is left as is.
    ///
    /// # Errors
    ///
    /// Returns `MissingMetadata` if the entity is not bound for tracking, or
    /// `InvalidId` if its `id` lies too far past the end of the collection.
    pub fn reindex(&mut self, handle: Handle) -> Result<()> {
        let entity = self.arena.get(handle)?;
        let tracking = entity
            .tracking
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::MissingMetadata(handle)))?;
        let id = entity.id;
        let collection = &mut self.types.entry_mut(&tracking.type_name)?.collection;
        match collection.place(id, handle)? {
            Some(previous) if previous != handle => {
                warn!(id, %handle, %previous, "reindex displaced another entity");
            }
            _ => {}
        }
        Ok(())
    }

    /// Releases an unidentified, closed allocation, returning its arena slot
    /// to the free list. The handle becomes stale.
    ///
    /// # Errors
    ///
    /// Returns `NotReleasable` if the entity has an identity, is open, or was
    /// not created by the factory.
    pub fn release(&mut self, handle: Handle) -> Result<Entity> {
        let entity = self.arena.get(handle)?;
        let reason = if !entity.is_allocated() {
            Some("not a factory allocation")
        } else if !self.is_unidentified(handle)? {
            Some("entity has an identity")
        } else if entity.is_open() {
            Some("entity is open")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(Error::new(ErrorKind::NotReleasable { handle, reason }));
        }

        debug!(%handle, "released allocation");
        self.arena.release(handle)
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Returns an entity.
    ///
    /// # Errors
    ///
    /// Returns `HandleNotFound` or `StaleHandle` for invalid handles.
    pub fn get(&self, handle: Handle) -> Result<&Entity> {
        self.arena.get(handle)
    }

    /// Returns an entity for editing.
    ///
    /// Edits are only tracked if the entity was opened first.
    ///
    /// # Errors
    ///
    /// Returns `HandleNotFound` or `StaleHandle` for invalid handles.
    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut Entity> {
        self.arena.get_mut(handle)
    }

    /// Looks up the entity with identity `id` in a type's collection.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if the type was never registered.
    pub fn lookup(&self, type_name: &str, id: u64) -> Result<Option<Handle>> {
        Ok(self.types.collection(type_name)?.get(id))
    }

    /// Returns true if the entity is a factory allocation that does not
    /// occupy the collection slot matching its `id`.
    ///
    /// Such an allocation has not received an identity yet. An allocation
    /// sitting at slot 0, because it was reindexed there or because slot 0
    /// is not reserved, is identified.
    ///
    /// # Errors
    ///
    /// Returns `HandleNotFound` or `StaleHandle` for invalid handles.
    pub fn is_unidentified(&self, handle: Handle) -> Result<bool> {
        let entity = self.arena.get(handle)?;
        let Some(tracking) = entity.tracking.as_ref().filter(|t| t.allocated) else {
            return Ok(false);
        };
        let slot = self.types.collection(&tracking.type_name)?.get(entity.id);
        Ok(slot != Some(handle))
    }

    /// Returns a type's collection.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if the type was never registered.
    pub fn collection(&self, type_name: &str) -> Result<&Collection> {
        self.types.collection(type_name)
    }

    /// Returns the modified list, holes included.
    #[must_use]
    pub fn modified_slots(&self) -> &[Option<Handle>] {
        &self.modified
    }

    /// Iterates over currently open entities in the order they were opened.
    pub fn modified(&self) -> impl Iterator<Item = &Entity> {
        self.modified
            .iter()
            .flatten()
            .filter_map(|handle| self.arena.get(*handle).ok())
    }

    /// Iterates over every entity in the store, in arena order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.arena.iter()
    }

    /// Returns the number of entities in the store.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.arena.len()
    }

    /// Takes the pending init work queued by [`Store::insert`] and
    /// [`Store::allocate`].
    pub fn take_pending(&mut self) -> Vec<PendingInit> {
        std::mem::take(&mut self.pending)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("types", &self.types)
            .field("entities", &self.arena.len())
            .field("modified", &self.modified)
            .field("hooks", &self.hooks)
            .field("pending", &self.pending.len())
            .finish()
    }
}
