//! Exporting a store's changes and replaying them into another store.

use shadowdb_foundation::{Error, ErrorContext, Handle, Result};
use shadowdb_store::{PendingInit, Store};
use tracing::{debug, trace};

use crate::patch::{Patch, PatchEntry};

/// Projects the store's modified list into a patch.
///
/// Holes stay holes. Allocations that do not occupy the collection slot
/// matching their `id` have no identity yet and are exported as holes as
/// well. An allocation that does sit at its slot is exported even when its
/// `id` is 0.
#[must_use]
pub fn dump(store: &Store) -> Patch {
    let patch: Patch = store
        .modified_slots()
        .iter()
        .copied()
        .map(|slot| {
            slot.filter(|handle| matches!(store.is_unidentified(*handle), Ok(false)))
                .and_then(|handle| store.get(handle).ok())
                .and_then(PatchEntry::from_entity)
        })
        .collect();

    debug!(
        entries = patch.iter().count(),
        slots = patch.len(),
        "dumped patch"
    );
    patch
}

/// Replays a patch into a store.
///
/// Every present entry replaces the whole entity with the same type and
/// `id`, or a new allocation of that type if there is none. The entity is
/// opened, overwritten, placed at its `id` and committed, so commit
/// observers see each loaded entity. Finally the type's init hook runs on
/// the merged entity.
///
/// Returns the pending work the init hooks handed back, for the caller to
/// await before treating the load as complete.
///
/// # Errors
///
/// Fails on the first entry that names an unknown type, whose `id` lies
/// too far past the end of its collection, or whose target entity is not
/// bound for tracking. The error context carries the entry's position.
/// Entries before it stay applied.
pub fn load(store: &mut Store, patch: &Patch) -> Result<Vec<PendingInit>> {
    let mut pending = Vec::new();

    for (position, entry) in patch.iter() {
        let init = load_entry(store, entry).map_err(|e| {
            e.with_context(
                ErrorContext::new()
                    .with_source("patch entry")
                    .with_position(position),
            )
        })?;
        pending.extend(init);
    }

    debug!(entries = patch.iter().count(), pending = pending.len(), "loaded patch");
    Ok(pending)
}

fn load_entry(store: &mut Store, entry: &PatchEntry) -> Result<Option<PendingInit>> {
    let type_name = entry.type_name();
    if !store.collection(type_name)?.admits(entry.id) {
        return Err(Error::invalid_id(entry.id));
    }
    let handle: Handle = match store.lookup(type_name, entry.id)? {
        Some(handle) => handle,
        None => store.allocate_like(type_name, &entry.fields)?,
    };

    let entity = store.open(handle)?;
    entity.fields = entry.fields.clone();
    let moved = entity.id != entry.id;
    entity.id = entry.id;

    // A fresh allocation is not in the collection yet
    if moved || entity.is_allocated() {
        store.reindex(handle)?;
    }

    let changed = store.commit(handle)?;
    trace!(type_name, id = entry.id, %handle, changed, "loaded patch entry");

    store.run_init_hook(handle)
}
