//! Source type definitions.

use std::hash::{
    Hash,
    Hasher,
};
use std::sync::Arc;

use thiserror::Error;

use super::Source;

/// Errors produced while loading a source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Error when failing to read from disk
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Error when a translation document is not valid JSON
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Error when a translation document is JSON but not an object
    #[error("Expected a JSON object of translations, found {0}")]
    NotAnObject(&'static str),
    /// Error when the configured root is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    /// Error when an archive cannot be opened or an entry cannot be found
    #[error("Invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// Error when an exclude pattern is not a valid glob
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),
    /// Error when the HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Error when the remote API answered with a non-success status
    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },
    /// Error when a load task panicked
    #[error("Load task panicked: {0}")]
    Panicked(String),
    /// Error when a load task was cancelled
    #[error("Load task was cancelled")]
    Cancelled,
    /// Error when no async runtime is available to dispatch loads
    #[error("No async runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Errors produced when registering a source with a loader.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    /// Error when a loader is registered as one of its own sources
    #[error("A loader cannot be registered as its own source")]
    SelfReference,
}

/// Shared, comparable handle to a [`Source`].
///
/// Two handles are equal when they point to the same source object, so the
/// handle can be used as a cache key.
#[derive(Debug, Clone)]
pub struct SourceHandle(Arc<dyn Source>);

impl SourceHandle {
    #[must_use]
    pub fn new(source: impl Source + 'static) -> Self {
        Self(Arc::new(source))
    }

    #[must_use]
    pub fn from_arc(source: Arc<dyn Source>) -> Self {
        Self(source)
    }

    #[must_use]
    pub fn source(&self) -> &Arc<dyn Source> {
        &self.0
    }

    /// Checks whether this handle points at `other`.
    pub(crate) fn points_to<T>(&self, other: &T) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), std::ptr::from_ref(other))
    }

    /// Address of the source object, without the vtable.
    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast::<()>()
    }
}

impl<S: Source + 'static> From<Arc<S>> for SourceHandle {
    fn from(source: Arc<S>) -> Self {
        Self(source)
    }
}

impl PartialEq for SourceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for SourceHandle {}

impl Hash for SourceHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use googletest::prelude::*;

    use super::*;
    use crate::model::Snapshot;
    use crate::source::MemorySource;

    #[googletest::test]
    fn test_clones_are_equal() {
        let handle = SourceHandle::new(MemorySource::new(Snapshot::empty()));
        let clone = handle.clone();

        expect_that!(handle == clone, eq(true));
    }

    #[googletest::test]
    fn test_equal_content_is_not_equal_identity() {
        let first = SourceHandle::new(MemorySource::new(Snapshot::empty()));
        let second = SourceHandle::new(MemorySource::new(Snapshot::empty()));

        expect_that!(first == second, eq(false));
    }

    #[googletest::test]
    fn test_handles_hash_by_identity() {
        let first = SourceHandle::new(MemorySource::new(Snapshot::empty()));
        let second = SourceHandle::new(MemorySource::new(Snapshot::empty()));

        let set: HashSet<_> = [first.clone(), first, second].into_iter().collect();

        expect_that!(set.len(), eq(2));
    }

    #[googletest::test]
    fn test_from_arc_keeps_identity() {
        let source = Arc::new(MemorySource::new(Snapshot::empty()));

        let first = SourceHandle::from(Arc::clone(&source));
        let second = SourceHandle::from(source);

        expect_that!(first == second, eq(true));
    }
}
