//! Translation sources and the loaders that combine them.

/// Zip archive source
pub mod archive;
/// Memoizing loader over static sources
pub mod cached;
/// Directory tree source
pub mod directory;
/// Concurrent fan-out loader
pub mod fan_out;
/// In-memory source
pub mod memory;
/// Remote translation API source
pub mod network;
/// Process-wide provider registry
pub mod registry;
/// Source handles and error types
mod types;

use async_trait::async_trait;

pub use archive::ArchiveSource;
pub use cached::CachingLoader;
pub use directory::DirectorySource;
pub use fan_out::FanOutLoader;
pub use memory::MemorySource;
pub use network::NetworkSource;
pub use registry::{
    ProviderRegistry,
    RegistrySource,
    TranslationProvider,
};
pub use types::{
    RegistrationError,
    SourceError,
    SourceHandle,
};

use crate::model::Snapshot;

/// Anything that can produce a [`Snapshot`] asynchronously.
///
/// A failed load is reported as `Err` and never leaves the future pending.
/// Aggregating loaders isolate the failure: they log it and contribute an
/// empty snapshot for that source.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Loads the current content of this source.
    async fn load(&self) -> Result<Snapshot, SourceError>;
}
