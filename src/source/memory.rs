//! Source backed by a snapshot held in memory.

use async_trait::async_trait;

use super::{
    Source,
    SourceError,
};
use crate::model::Snapshot;

/// Yields the same snapshot on every load.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    /// Snapshot handed out by `load`
    snapshot: Snapshot,
}

impl MemorySource {
    #[must_use]
    pub const fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl Source for MemorySource {
    async fn load(&self) -> Result<Snapshot, SourceError> {
        Ok(self.snapshot.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::snapshot;

    #[tokio::test]
    async fn test_load_returns_snapshot() {
        let expected = snapshot(&[("en_us", &[("hello", "Hello")])]);
        let source = MemorySource::new(expected.clone());

        let loaded = source.load().await.unwrap();

        assert_eq!(loaded, expected);
    }
}
