//! Type registration and per-type collections.
//!
//! Every entity type is registered once with a [`TypeDef`] before any entity
//! of that type exists. Registration creates the type's [`Collection`], the
//! sparse sequence that maps an entity's `id` to the entity.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use shadowdb_foundation::{Error, Handle, RecordSchema, Result};

use crate::entity::Entity;

/// Out-of-band follow-up work started by an init hook.
///
/// The store never polls these; callers collect and await them.
pub type PendingInit = Pin<Box<dyn Future<Output = ()>>>;

/// Most holes a single placement may open past the end of a collection.
pub const MAX_ID_GAP: usize = 1 << 16;

/// Structural-initialization hook, run when an entity of the type is
/// allocated and again after a patch is merged into it. Used to populate
/// derived or runtime-only fields.
pub type InitHook = Box<dyn Fn(&mut Entity) -> Option<PendingInit>>;

/// Definition of an entity type.
pub struct TypeDef {
    name: Arc<str>,
    init: Option<InitHook>,
    schema: Option<RecordSchema>,
}

impl TypeDef {
    /// Creates a type definition with no hook and no schema.
    ///
    /// Without a schema, new entities are shaped after the most recent
    /// existing entity of the type.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            init: None,
            schema: None,
        }
    }

    /// Sets the structural-initialization hook.
    #[must_use]
    pub fn with_init<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut Entity) -> Option<PendingInit> + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }

    /// Sets an explicit schema that new entities are built from.
    #[must_use]
    pub fn with_schema(mut self, schema: RecordSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the schema, if one was given.
    #[must_use]
    pub fn schema(&self) -> Option<&RecordSchema> {
        self.schema.as_ref()
    }

    /// Runs the init hook against an entity.
    pub(crate) fn init(&self, entity: &mut Entity) -> Option<PendingInit> {
        self.init.as_ref().and_then(|init| init(entity))
    }
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDef")
            .field("name", &self.name)
            .field("init", &self.init.is_some())
            .field("schema", &self.schema)
            .finish()
    }
}

/// Sparse, id-addressed sequence of the entities of one type.
///
/// Identities are handed out by appending and are never reused; cleared
/// slots stay behind as holes.
#[derive(Clone, Debug, Default)]
pub struct Collection {
    slots: Vec<Option<Handle>>,
}

impl Collection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Returns the entity at `id`, if the slot is occupied.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<Handle> {
        let index = usize::try_from(id).ok()?;
        self.slots.get(index).copied().flatten()
    }

    /// Returns true if an entity can be placed at `id`: the slot exists or
    /// lies at most [`MAX_ID_GAP`] holes past the end.
    #[must_use]
    pub fn admits(&self, id: u64) -> bool {
        self.index_for(id).is_some()
    }

    fn index_for(&self, id: u64) -> Option<usize> {
        let index = usize::try_from(id).ok()?;
        (index.saturating_sub(self.slots.len()) <= MAX_ID_GAP).then_some(index)
    }

    /// Returns the number of slots, holes included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the collection has no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the number of occupied slots.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Iterates over occupied slots as `(id, handle)` pairs.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (u64, Handle)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.map(|handle| (id as u64, handle)))
    }

    /// Appends an entity at the next free identity and returns that identity.
    ///
    /// With `reserve_zero`, an empty collection first gets a hole at slot 0
    /// so the returned identity is never 0.
    pub(crate) fn append(&mut self, handle: Handle, reserve_zero: bool) -> u64 {
        if reserve_zero && self.slots.is_empty() {
            self.slots.push(None);
        }
        self.slots.push(Some(handle));
        (self.slots.len() - 1) as u64
    }

    /// Places an entity at `id`, growing the collection with holes as needed.
    ///
    /// Returns the entity previously in the slot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` if `id` lies more than [`MAX_ID_GAP`] holes past
    /// the end of the collection.
    pub(crate) fn place(&mut self, id: u64, handle: Handle) -> Result<Option<Handle>> {
        let index = self.index_for(id).ok_or_else(|| Error::invalid_id(id))?;
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        Ok(self.slots[index].replace(handle))
    }

    /// Clears the slot at `id` if it holds `handle`.
    pub(crate) fn clear(&mut self, id: u64, handle: Handle) -> bool {
        let Ok(index) = usize::try_from(id) else {
            return false;
        };
        match self.slots.get_mut(index) {
            Some(slot) if *slot == Some(handle) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }
}

pub(crate) struct TypeEntry {
    pub(crate) def: TypeDef,
    pub(crate) collection: Collection,
}

/// Registry of entity types and their collections.
///
/// Entries are created once and never removed.
#[derive(Default)]
pub struct TypeRegistry {
    types: HashMap<Arc<str>, TypeEntry>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Registers a type and creates its empty collection.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateType` if a type with the same name exists.
    pub fn register(&mut self, def: TypeDef) -> Result<()> {
        if self.types.contains_key(&def.name) {
            return Err(Error::duplicate_type(&*def.name));
        }
        self.types.insert(
            def.name.clone(),
            TypeEntry {
                def,
                collection: Collection::new(),
            },
        );
        Ok(())
    }

    /// Returns true if the type is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Returns the definition of a type.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if the type was never registered.
    pub fn def(&self, name: &str) -> Result<&TypeDef> {
        self.entry(name).map(|entry| &entry.def)
    }

    /// Returns the collection of a type.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if the type was never registered.
    pub fn collection(&self, name: &str) -> Result<&Collection> {
        self.entry(name).map(|entry| &entry.collection)
    }

    /// Iterates over registered type names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|name| &**name)
    }

    pub(crate) fn entry(&self, name: &str) -> Result<&TypeEntry> {
        self.types.get(name).ok_or_else(|| Error::unknown_type(name))
    }

    pub(crate) fn entry_mut(&mut self, name: &str) -> Result<&mut TypeEntry> {
        self.types.get_mut(name).ok_or_else(|| Error::unknown_type(name))
    }

    /// Returns the interned name of a registered type.
    pub(crate) fn name_of(&self, name: &str) -> Result<Arc<str>> {
        self.entry(name).map(|entry| entry.def.name.clone())
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.types.iter().map(|(name, entry)| (name, &entry.collection)))
            .finish()
    }
}
