//! Thread-confined storage for the currently active context.

use crate::errors::ContextflowError;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HOLDER_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    /// Per-thread slots, keyed by holder id.
    ///
    /// A slot exists only while a context is installed, so a reused pool
    /// thread carries nothing between unrelated tasks. The whole map is torn
    /// down with the thread.
    static SLOTS: RefCell<HashMap<u64, Box<dyn Any>>> = RefCell::new(HashMap::new());
}

/// A thread-confined cell holding the currently active context.
///
/// Each holder instance is an independent logical cell: two holders never
/// observe each other's values, and the same holder observed from two
/// threads sees two independent values. Clones of a holder refer to the same
/// logical cell, which is how decorators and submitting code share one.
///
/// Unlike a process-wide singleton, holders can be created fresh per test.
/// Storage is confined to the accessing thread, so no locking is involved.
///
/// # Examples
///
/// ```rust
/// use contextflow::context::ContextHolder;
///
/// let holder: ContextHolder<String> = ContextHolder::new();
/// assert_eq!(holder.get().unwrap(), None);
///
/// holder.set("alice".to_string()).unwrap();
/// assert_eq!(holder.get().unwrap(), Some("alice".to_string()));
///
/// holder.clear().unwrap();
/// assert_eq!(holder.get().unwrap(), None);
/// ```
pub struct ContextHolder<C> {
    id: u64,
    _marker: PhantomData<fn() -> C>,
}

impl<C> Clone for ContextHolder<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            _marker: PhantomData,
        }
    }
}

impl<C: Clone + Send + 'static> ContextHolder<C> {
    /// Creates a new holder with its own logical cell.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_HOLDER_ID.fetch_add(1, Ordering::Relaxed),
            _marker: PhantomData,
        }
    }

    /// Returns a copy of the context currently active on this thread, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ContextflowError::HolderUnavailable`] if the thread-local
    /// storage has been torn down (thread destruction).
    pub fn get(&self) -> Result<Option<C>, ContextflowError> {
        SLOTS
            .try_with(|slots| {
                slots
                    .borrow()
                    .get(&self.id)
                    .and_then(|slot| slot.downcast_ref::<C>())
                    .cloned()
            })
            .map_err(|_| ContextflowError::HolderUnavailable)
    }

    /// Installs a context as the current one for this thread.
    ///
    /// # Errors
    ///
    /// Returns [`ContextflowError::HolderUnavailable`] if the thread-local
    /// storage has been torn down.
    pub fn set(&self, context: C) -> Result<(), ContextflowError> {
        self.replace(Some(context)).map(|_| ())
    }

    /// Removes the current context for this thread, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ContextflowError::HolderUnavailable`] if the thread-local
    /// storage has been torn down.
    pub fn clear(&self) -> Result<(), ContextflowError> {
        self.replace(None).map(|_| ())
    }

    /// Swaps the current context for this thread, returning the prior value.
    ///
    /// `None` uninstalls. This is the primitive the install/restore protocol
    /// is built on: restoring means replacing with the recorded prior value,
    /// never unconditionally clearing.
    ///
    /// # Errors
    ///
    /// Returns [`ContextflowError::HolderUnavailable`] if the thread-local
    /// storage has been torn down.
    pub fn replace(&self, context: Option<C>) -> Result<Option<C>, ContextflowError> {
        SLOTS
            .try_with(|slots| {
                let mut slots = slots.borrow_mut();
                let prior = slots
                    .remove(&self.id)
                    .and_then(|slot| slot.downcast::<C>().ok())
                    .map(|boxed| *boxed);
                if let Some(context) = context {
                    slots.insert(self.id, Box::new(context));
                }
                prior
            })
            .map_err(|_| ContextflowError::HolderUnavailable)
    }
}

impl<C: Clone + Send + 'static> Default for ContextHolder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for ContextHolder<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextHolder").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holder_starts_empty() {
        let holder: ContextHolder<u64> = ContextHolder::new();
        assert_eq!(holder.get().unwrap(), None);
    }

    #[test]
    fn test_set_get_clear() {
        let holder = ContextHolder::new();
        holder.set(7_u64).unwrap();
        assert_eq!(holder.get().unwrap(), Some(7));
        holder.clear().unwrap();
        assert_eq!(holder.get().unwrap(), None);
    }

    #[test]
    fn test_replace_returns_prior() {
        let holder = ContextHolder::new();
        assert_eq!(holder.replace(Some(1_u64)).unwrap(), None);
        assert_eq!(holder.replace(Some(2)).unwrap(), Some(1));
        assert_eq!(holder.replace(None).unwrap(), Some(2));
        assert_eq!(holder.get().unwrap(), None);
    }

    #[test]
    fn test_clones_share_the_cell() {
        let holder = ContextHolder::new();
        let alias = holder.clone();
        holder.set("shared".to_string()).unwrap();
        assert_eq!(alias.get().unwrap(), Some("shared".to_string()));
    }

    #[test]
    fn test_distinct_holders_are_isolated() {
        let first = ContextHolder::new();
        let second = ContextHolder::new();
        first.set(1_u64).unwrap();
        second.set(2_u64).unwrap();
        assert_eq!(first.get().unwrap(), Some(1));
        assert_eq!(second.get().unwrap(), Some(2));
    }

    #[test]
    fn test_other_threads_see_nothing() {
        let holder = ContextHolder::new();
        holder.set("main".to_string()).unwrap();

        let remote = holder.clone();
        let observed = std::thread::spawn(move || remote.get().unwrap())
            .join()
            .unwrap();

        assert_eq!(observed, None);
        assert_eq!(holder.get().unwrap(), Some("main".to_string()));
    }
}
