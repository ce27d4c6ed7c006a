//! Sharing a document across threads.
//!
//! A [`Document`] is `Send + Sync`, and within one thread the borrow checker
//! already enforces one writer or many readers. [`SharedDocument`] carries
//! the same discipline across threads with a `parking_lot::RwLock`: queries
//! hold a read guard for as long as their results are borrowed, so nothing
//! can mutate the index while it is being iterated.

use crate::document::Document;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Reference-counted, lock-guarded document.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use tessera::{builtin, AttributeMap, Document, TypeRegistry};
///
/// let doc = Document::new(Arc::new(TypeRegistry::new()), "d", "a b").into_shared();
///
/// let writer = doc.clone();
/// thread::spawn(move || {
///     let mut doc = writer.write();
///     doc.create_annotation(builtin::TOKEN, 0, 1, AttributeMap::new()).unwrap();
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(doc.read().annotation_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SharedDocument {
    inner: Arc<RwLock<Document>>,
}

impl SharedDocument {
    /// Wrap a document.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            inner: Arc::new(RwLock::new(document)),
        }
    }

    /// Acquire shared read access, blocking while a writer holds the lock.
    pub fn read(&self) -> RwLockReadGuard<'_, Document> {
        self.inner.read()
    }

    /// Acquire exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, Document> {
        self.inner.write()
    }

    /// Read access without blocking, if no writer holds the lock.
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, Document>> {
        self.inner.try_read()
    }

    /// Take the document back if this is the last handle.
    pub fn try_unwrap(self) -> Result<Document, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl From<Document> for SharedDocument {
    fn from(document: Document) -> Self {
        Self::new(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{builtin, AttributeMap, TypeRegistry};

    #[test]
    fn test_try_unwrap_requires_last_handle() {
        let shared = Document::new(Arc::new(TypeRegistry::new()), "d", "x").into_shared();
        let other = shared.clone();
        let shared = shared.try_unwrap().unwrap_err();
        drop(other);
        let doc = shared.try_unwrap().unwrap();
        assert_eq!(doc.id(), "d");
    }

    #[test]
    fn test_writer_blocks_readers() {
        let shared = Document::new(Arc::new(TypeRegistry::new()), "d", "ab").into_shared();
        {
            let mut doc = shared.write();
            doc.create_annotation(builtin::TOKEN, 0, 2, AttributeMap::new())
                .unwrap();
            assert!(shared.try_read().is_none());
        }
        assert_eq!(shared.try_read().map(|d| d.annotation_count()), Some(1));
    }
}
