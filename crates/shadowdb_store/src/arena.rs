//! Entity arena with generational indices.
//!
//! Entities live in slots addressed by [`Handle`]. Released slots go onto a
//! free list and are reused with a bumped generation, so handles to released
//! entities are detected as stale instead of aliasing the new occupant.

use shadowdb_foundation::{Error, Handle, Result};

use crate::entity::Entity;

struct Slot {
    /// Even generations are free, odd generations are alive.
    generation: u32,
    entity: Option<Entity>,
}

pub(crate) struct Arena {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live_count: usize,
}

impl Arena {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live_count: 0,
        }
    }

    /// Stores a new entity built by `make` for the handle it will live at.
    ///
    /// Reuses indices from the free list when available.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn spawn(&mut self, make: impl FnOnce(Handle) -> Entity) -> Handle {
        self.live_count += 1;

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            // Was even/free, now odd/alive
            slot.generation += 1;
            let handle = Handle::new(index, slot.generation);
            slot.entity = Some(make(handle));
            handle
        } else {
            let index = self.slots.len() as u32;
            // New slots start at generation 1 (odd = alive)
            let handle = Handle::new(index, 1);
            self.slots.push(Slot {
                generation: 1,
                entity: Some(make(handle)),
            });
            handle
        }
    }

    /// Removes an entity and puts its slot on the free list.
    pub(crate) fn release(&mut self, handle: Handle) -> Result<Entity> {
        self.validate(handle)?;

        let slot = &mut self.slots[handle.index as usize];
        // Was odd/alive, now even/free
        slot.generation += 1;
        self.free_list.push(handle.index);
        self.live_count -= 1;

        slot.entity
            .take()
            .ok_or_else(|| Error::handle_not_found(handle))
    }

    pub(crate) fn validate(&self, handle: Handle) -> Result<()> {
        let Some(slot) = self.slots.get(handle.index as usize) else {
            return Err(Error::handle_not_found(handle));
        };

        if slot.generation != handle.generation {
            return Err(Error::stale_handle(handle));
        }

        if slot.generation % 2 == 0 {
            return Err(Error::handle_not_found(handle));
        }

        Ok(())
    }

    pub(crate) fn get(&self, handle: Handle) -> Result<&Entity> {
        self.validate(handle)?;
        self.slots[handle.index as usize]
            .entity
            .as_ref()
            .ok_or_else(|| Error::handle_not_found(handle))
    }

    pub(crate) fn get_mut(&mut self, handle: Handle) -> Result<&mut Entity> {
        self.validate(handle)?;
        self.slots[handle.index as usize]
            .entity
            .as_mut()
            .ok_or_else(|| Error::handle_not_found(handle))
    }

    pub(crate) fn len(&self) -> usize {
        self.live_count
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter_map(|slot| slot.entity.as_ref())
    }
}
