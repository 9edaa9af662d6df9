//! Shared handle to the current vector index.
//!
//! The index itself is immutable after build. The handle holds an
//! `Option<Arc<VectorIndex>>` behind a lock that is taken only for the
//! instant of a snapshot or an install: readers clone the Arc and then
//! query lock-free, so a rebuild swapping in a replacement never affects
//! in-flight queries against the old index.

use crate::index::VectorIndex;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Injectable handle owning the "is the index built yet" state.
#[derive(Debug, Default)]
pub struct IndexHandle {
    inner: RwLock<Option<Arc<VectorIndex>>>,
}

impl IndexHandle {
    /// Create an empty handle (no index installed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an index is currently installed.
    pub fn is_ready(&self) -> bool {
        self.read().is_some()
    }

    /// Get the current index, if built.
    ///
    /// The returned Arc stays valid across concurrent rebuilds.
    pub fn snapshot(&self) -> Option<Arc<VectorIndex>> {
        self.read().clone()
    }

    /// Atomically install a freshly built index, replacing any prior one.
    ///
    /// Returns the installed Arc.
    pub fn install(&self, index: VectorIndex) -> Arc<VectorIndex> {
        let index = Arc::new(index);
        *self.write() = Some(index.clone());
        index
    }

    /// Remove the installed index, if any.
    pub fn clear(&self) {
        *self.write() = None;
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Arc<VectorIndex>>> {
        // A poisoned lock only means a reader/writer panicked mid-access;
        // the Option it guards is still structurally valid.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Arc<VectorIndex>>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DocumentChunk;

    fn index_with_text(text: &str) -> VectorIndex {
        VectorIndex::new(vec![DocumentChunk {
            position: 0,
            text: text.to_string(),
            embedding: vec![1.0, 0.0],
        }])
        .unwrap()
    }

    #[test]
    fn test_empty_handle_not_ready() {
        let handle = IndexHandle::new();
        assert!(!handle.is_ready());
        assert!(handle.snapshot().is_none());
    }

    #[test]
    fn test_install_and_snapshot() {
        let handle = IndexHandle::new();
        handle.install(index_with_text("a"));

        assert!(handle.is_ready());
        let snapshot = handle.snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_rebuild_keeps_old_snapshot_alive() {
        let handle = IndexHandle::new();
        handle.install(index_with_text("old"));

        let old = handle.snapshot().unwrap();
        let old_id = old.stats().build_id.clone();

        handle.install(index_with_text("new"));
        let new = handle.snapshot().unwrap();

        // In-flight reader still sees the old build; handle serves the new one
        assert_eq!(old.stats().build_id, old_id);
        assert_ne!(new.stats().build_id, old_id);
        assert_eq!(old.search(&[1.0, 0.0], 1)[0].0.text, "old");
        assert_eq!(new.search(&[1.0, 0.0], 1)[0].0.text, "new");
    }

    #[test]
    fn test_clear() {
        let handle = IndexHandle::new();
        handle.install(index_with_text("a"));
        handle.clear();
        assert!(!handle.is_ready());
    }
}
