//! Process-wide registry of translation providers.
//!
//! Plugins register a [`TranslationProvider`] once; a [`RegistrySource`]
//! placed in the source tree then loads whatever is registered at the time of
//! each load.

use std::sync::{
    Arc,
    LazyLock,
};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::fan_out::{
    dispatch_all,
    isolate_failure,
};
use super::{
    Source,
    SourceError,
    SourceHandle,
};
use crate::model::Snapshot;

/// Registry shared by the whole process.
static GLOBAL_REGISTRY: LazyLock<Arc<ProviderRegistry>> =
    LazyLock::new(|| Arc::new(ProviderRegistry::new()));

/// Creates the source of one plugin.
pub trait TranslationProvider: Send + Sync + std::fmt::Debug {
    fn create(&self) -> SourceHandle;
}

/// Ordered list of providers.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    /// Providers in registration order
    providers: RwLock<Vec<Arc<dyn TranslationProvider>>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    pub fn register(&self, provider: Arc<dyn TranslationProvider>) {
        self.providers.write().push(provider);
    }

    #[must_use]
    pub fn providers(&self) -> Vec<Arc<dyn TranslationProvider>> {
        self.providers.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}

/// Source loading the sources of every registered provider.
///
/// Providers are asked for a fresh source on every load, and the sources are
/// dispatched concurrently and merged in registration order.
#[derive(Debug, Clone)]
pub struct RegistrySource {
    /// Registry to read providers from
    registry: Arc<ProviderRegistry>,
}

impl RegistrySource {
    #[must_use]
    pub const fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Source over the process-wide registry.
    #[must_use]
    pub fn global() -> Self {
        Self::new(ProviderRegistry::global())
    }
}

#[async_trait]
impl Source for RegistrySource {
    async fn load(&self) -> Result<Snapshot, SourceError> {
        let sources: Vec<SourceHandle> =
            self.registry.providers().iter().map(|provider| provider.create()).collect();
        tracing::debug!(providers = sources.len(), "Loading registered translation providers");

        let results = dispatch_all(&sources).await?;
        let snapshots: Vec<Snapshot> = sources
            .iter()
            .zip(results)
            .filter_map(|(source, result)| isolate_failure(source, result))
            .collect();
        Ok(Snapshot::merge_all(&snapshots))
    }
}
