//! Global commit observers.

use std::fmt;

use crate::entity::Entity;

/// Observer invoked on every commit of every entity, whatever its type.
///
/// Context the observer needs is captured by the closure.
pub type CommitHook = Box<dyn FnMut(&Entity)>;

/// Append-only list of commit observers.
///
/// Observers fire in registration order on every commit, including commits
/// that detect no change. There is no removal; observers live as long as
/// the store.
#[derive(Default)]
pub struct CommitHooks {
    hooks: Vec<CommitHook>,
}

impl CommitHooks {
    /// Creates an empty hook list.
    #[must_use]
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Appends an observer.
    pub fn register<F>(&mut self, hook: F)
    where
        F: FnMut(&Entity) + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    /// Returns the number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true if no observers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub(crate) fn fire(&mut self, entity: &Entity) {
        for hook in &mut self.hooks {
            hook(entity);
        }
    }
}

impl fmt::Debug for CommitHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitHooks")
            .field("len", &self.hooks.len())
            .finish()
    }
}
