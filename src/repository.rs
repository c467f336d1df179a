//! Identifier registries consulted by the existence check.
//!
//! The core only ever asks "does this id exist?". Storage and locking are
//! the registry's business.

use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};

/// Synchronous membership query over known identifiers.
///
/// Handlers reach it through
/// [`HandlerContext::require_exists`](crate::HandlerContext::require_exists).
/// Implementations must be safe to query from concurrent requests.
pub trait IdentifierRegistry: Send + Sync {
    /// Whether `id` refers to an existing entity.
    fn contains(&self, id: i64) -> bool;
}

/// An in-memory identifier set guarded by a read-write lock.
///
/// # Examples
///
/// ```
/// use binding_core::{IdentifierRegistry, InMemoryRegistry};
///
/// let people = InMemoryRegistry::new([1, 2, 3]);
/// assert!(people.contains(2));
///
/// people.insert(42);
/// assert!(people.contains(42));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    ids: RwLock<BTreeSet<i64>>,
}

impl InMemoryRegistry {
    /// Creates a registry holding `ids`.
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: RwLock::new(ids.into_iter().collect()),
        }
    }

    /// Adds an identifier. Returns `false` if it was already present.
    pub fn insert(&self, id: i64) -> bool {
        self.ids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id)
    }

    /// Removes an identifier. Returns `false` if it was not present.
    pub fn remove(&self, id: i64) -> bool {
        self.ids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    /// Number of known identifiers.
    pub fn len(&self) -> usize {
        self.ids.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if no identifier is known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentifierRegistry for InMemoryRegistry {
    fn contains(&self, id: i64) -> bool {
        self.ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }
}
