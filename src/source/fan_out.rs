//! Concurrent fan-out over an ordered list of sources.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::task::JoinError;

use super::{
    RegistrationError,
    Source,
    SourceError,
    SourceHandle,
};
use crate::model::Snapshot;

/// Loads every source concurrently and merges the results in source order.
///
/// A `FanOutLoader` is itself a [`Source`], so loaders can be nested (for
/// example one per plugin, aggregated by an outer loader).
#[derive(Debug, Default)]
pub struct FanOutLoader {
    /// Sources in registration order
    sources: RwLock<Vec<SourceHandle>>,
}

impl FanOutLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sources(sources: impl IntoIterator<Item = SourceHandle>) -> Self {
        Self { sources: RwLock::new(sources.into_iter().collect()) }
    }

    /// Appends a source. Affects loads issued after this call only.
    ///
    /// # Errors
    /// Returns [`RegistrationError::SelfReference`] when `source` is this loader.
    pub fn add_source(&self, source: SourceHandle) -> Result<(), RegistrationError> {
        if source.points_to(self) {
            return Err(RegistrationError::SelfReference);
        }
        self.sources.write().push(source);
        Ok(())
    }

    /// Removes every occurrence of `source`. Returns whether anything was removed.
    pub fn remove_source(&self, source: &SourceHandle) -> bool {
        let mut sources = self.sources.write();
        let before = sources.len();
        sources.retain(|registered| registered != source);
        sources.len() != before
    }

    #[must_use]
    pub fn sources(&self) -> Vec<SourceHandle> {
        self.sources.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.read().is_empty()
    }
}

#[async_trait]
impl Source for FanOutLoader {
    async fn load(&self) -> Result<Snapshot, SourceError> {
        // in-flight loads keep the list they started with
        let sources = self.sources();
        tracing::debug!(count = sources.len(), "Dispatching translation sources");

        let results = dispatch_all(&sources).await?;
        let snapshots: Vec<Snapshot> = sources
            .iter()
            .zip(results)
            .filter_map(|(source, result)| isolate_failure(source, result))
            .collect();

        let merged = Snapshot::merge_all(&snapshots);
        tracing::debug!(
            loaded = snapshots.len(),
            failed = sources.len() - snapshots.len(),
            locales = merged.len(),
            "Merged translation sources"
        );
        Ok(merged)
    }
}

/// Spawns the load of every source, then waits for all of them.
///
/// All loads are dispatched before the first one is awaited. Results are in
/// the order of `sources`, regardless of completion order.
///
/// # Errors
/// Fails only when the runtime itself is unusable: no runtime is available or
/// a load task was cancelled. A failing or panicking source is reported in its
/// own slot of the returned vector.
pub(crate) async fn dispatch_all(
    sources: &[SourceHandle],
) -> Result<Vec<Result<Snapshot, SourceError>>, SourceError> {
    let runtime = Handle::try_current()?;

    let tasks: Vec<_> = sources
        .iter()
        .map(|handle| {
            let source = Arc::clone(handle.source());
            runtime.spawn(async move { source.load().await })
        })
        .collect();

    futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| match joined {
            Ok(result) => Ok(result),
            Err(error) if error.is_panic() => Ok(Err(SourceError::Panicked(panic_message(error)))),
            Err(_) => Err(SourceError::Cancelled),
        })
        .collect()
}

/// Logs a failed load and drops it from the merge.
pub(crate) fn isolate_failure(
    source: &SourceHandle,
    result: Result<Snapshot, SourceError>,
) -> Option<Snapshot> {
    match result {
        Ok(snapshot) => Some(snapshot),
        Err(error) => {
            tracing::warn!(?source, %error, "Translation source failed, continuing without it");
            None
        }
    }
}

/// Extracts the panic payload of a join error as text.
fn panic_message(error: JoinError) -> String {
    let payload = error.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use googletest::prelude::*;

    use super::*;
    use crate::source::MemorySource;
    use crate::test_utils::{
        BarrierSource,
        CountingSource,
        DelayedSource,
        FailingSource,
        GatedSource,
        PanickingSource,
        snapshot,
    };

    #[tokio::test]
    async fn test_merges_in_source_order() {
        let loader = FanOutLoader::with_sources([
            SourceHandle::new(MemorySource::new(snapshot(&[("en_us", &[("a", "A1"), ("b", "B1")])]))),
            SourceHandle::new(MemorySource::new(snapshot(&[
                ("en_us", &[("b", "B2"), ("c", "C2")]),
                ("de_de", &[("a", "A-de")]),
            ]))),
        ]);

        let merged = loader.load().await.unwrap();

        let expected = snapshot(&[
            ("en_us", &[("a", "A1"), ("b", "B2"), ("c", "C2")]),
            ("de_de", &[("a", "A-de")]),
        ]);
        assert_eq!(merged, expected);
    }

    #[tokio::test]
    async fn test_dispatches_all_before_awaiting_any() {
        let count = 4;
        let barrier = Arc::new(tokio::sync::Barrier::new(count));
        let loader = FanOutLoader::with_sources((0..count).map(|i| {
            SourceHandle::new(BarrierSource::new(
                Arc::clone(&barrier),
                snapshot(&[("en_us", &[(format!("key.{i}").as_str(), "value")])]),
            ))
        }));

        // a sequential implementation would never get past the barrier
        let merged = tokio::time::timeout(Duration::from_secs(5), loader.load())
            .await
            .expect("sources were not dispatched concurrently")
            .unwrap();

        assert_eq!(merged.get("en_us").unwrap().len(), count);
    }

    #[tokio::test]
    async fn test_completion_order_does_not_change_precedence() {
        let loader = FanOutLoader::with_sources([
            SourceHandle::new(DelayedSource::new(
                Duration::from_millis(50),
                snapshot(&[("en_us", &[("key", "slow-first")])]),
            )),
            SourceHandle::new(MemorySource::new(snapshot(&[("en_us", &[("key", "fast-second")])]))),
        ]);

        let merged = loader.load().await.unwrap();

        assert_eq!(merged.get("en_us").unwrap().get("key"), Some("fast-second"));
    }

    #[tokio::test]
    async fn test_failed_source_is_isolated() {
        let loader = FanOutLoader::with_sources([
            SourceHandle::new(MemorySource::new(snapshot(&[("en_us", &[("a", "A")])]))),
            SourceHandle::new(FailingSource),
            SourceHandle::new(PanickingSource),
        ]);

        let merged = loader.load().await.unwrap();

        assert_eq!(merged, snapshot(&[("en_us", &[("a", "A")])]));
    }

    #[tokio::test]
    async fn test_nested_loaders() {
        let inner = FanOutLoader::with_sources([
            SourceHandle::new(MemorySource::new(snapshot(&[("en_us", &[("a", "inner")])]))),
            SourceHandle::new(MemorySource::new(snapshot(&[("de_de", &[("a", "innen")])]))),
        ]);
        let outer = FanOutLoader::with_sources([
            SourceHandle::new(inner),
            SourceHandle::new(MemorySource::new(snapshot(&[("en_us", &[("b", "outer")])]))),
        ]);

        let merged = outer.load().await.unwrap();

        assert_eq!(
            merged,
            snapshot(&[("en_us", &[("a", "inner"), ("b", "outer")]), ("de_de", &[("a", "innen")])])
        );
    }

    #[tokio::test]
    async fn test_every_source_is_loaded_once_per_load() {
        let counting = Arc::new(CountingSource::new(Snapshot::empty()));
        let loader = FanOutLoader::with_sources([SourceHandle::from(Arc::clone(&counting))]);

        loader.load().await.unwrap();
        loader.load().await.unwrap();

        assert_eq!(counting.loads.load(Ordering::SeqCst), 2);
    }

    #[googletest::test]
    fn test_add_self_is_rejected() {
        let loader = Arc::new(FanOutLoader::new());

        let result = loader.add_source(SourceHandle::from(Arc::clone(&loader)));

        assert_eq!(result, Err(RegistrationError::SelfReference));
        expect_that!(loader.is_empty(), eq(true));
    }

    #[googletest::test]
    fn test_remove_source() {
        let source = SourceHandle::new(MemorySource::default());
        let other = SourceHandle::new(MemorySource::default());
        let loader = FanOutLoader::with_sources([source.clone(), other]);

        expect_that!(loader.remove_source(&source), eq(true));
        expect_that!(loader.remove_source(&source), eq(false));
        expect_that!(loader.len(), eq(1));
    }

    #[tokio::test]
    async fn test_source_added_during_load_affects_next_load_only() {
        let gate = Arc::new(GatedSource::new(snapshot(&[("en_us", &[("a", "A")])])));
        let loader = Arc::new(FanOutLoader::with_sources([SourceHandle::from(Arc::clone(&gate))]));

        let in_flight = tokio::spawn({
            let loader = Arc::clone(&loader);
            async move { loader.load().await }
        });
        gate.wait_started().await;
        loader
            .add_source(SourceHandle::new(MemorySource::new(snapshot(&[("en_us", &[("b", "B")])]))))
            .unwrap();
        gate.open();

        let first = in_flight.await.unwrap().unwrap();
        let second = loader.load().await.unwrap();

        assert_eq!(first.get("en_us").unwrap().len(), 1);
        assert_eq!(second.get("en_us").unwrap().len(), 2);
    }

    #[test]
    fn test_load_without_runtime_fails() {
        let loader = FanOutLoader::with_sources([SourceHandle::new(MemorySource::default())]);

        let result = futures::executor::block_on(loader.load());

        assert!(matches!(result, Err(SourceError::NoRuntime(_))));
    }
}
