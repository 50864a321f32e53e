//! Translation data model.
//!
//! Published values ([`TranslationUnit`], [`Snapshot`]) are immutable; the
//! mutable counterparts ([`MutableUnit`], [`SnapshotBuilder`]) are only used
//! while a load pipeline is still assembling its result.

/// Thread-safe snapshot accumulator
mod builder;
/// Locale to unit mapping
mod snapshot;
/// Key to value mapping for one locale
mod unit;

pub use builder::SnapshotBuilder;
pub use snapshot::Snapshot;
pub use unit::{
    MutableUnit,
    TranslationUnit,
};
