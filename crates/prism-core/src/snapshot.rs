//! Immutable, cheaply cloneable views of a projected collection.

use std::{ops::Deref, sync::Arc};

/// One published state of a projected collection.
///
/// `version` counts applied operations since the projection was created, so
/// two snapshots with different versions always come from different applied
/// operations even if their contents compare equal.
#[derive(Debug, PartialEq, Eq)]
pub struct Snapshot<T> {
    version: u64,
    items: Arc<[T]>,
}

impl<T> Snapshot<T> {
    /// Create a snapshot from owned items.
    pub fn new(version: u64, items: Vec<T>) -> Self {
        Self { version, items: items.into() }
    }

    /// Empty snapshot at version 0.
    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    /// Number of operations applied when this snapshot was taken.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Items in display order.
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self { version: self.version, items: Arc::clone(&self.items) }
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}
