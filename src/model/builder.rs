//! Mutable accumulator for snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{
    MutableUnit,
    Snapshot,
};

/// Thread-safe builder that absorbs snapshots and unit fragments.
///
/// Used by the file parsers (one fragment per file) and by the loaders when
/// folding the results of concurrent sources. Nothing built here is visible to
/// readers until [`SnapshotBuilder::build`] freezes it.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    /// Locale name → unit under construction
    units: Mutex<HashMap<String, Arc<MutableUnit>>>,
}

impl SnapshotBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the unit for `locale`, creating it if absent.
    #[must_use]
    pub fn unit(&self, locale: &str) -> Arc<MutableUnit> {
        let mut units = self.units.lock();
        if let Some(unit) = units.get(locale) {
            return Arc::clone(unit);
        }
        let unit = Arc::new(MutableUnit::new());
        units.insert(locale.to_string(), Arc::clone(&unit));
        unit
    }

    /// Merges every locale of `other` into this builder. Later merges win.
    pub fn merge(&self, other: &Snapshot) {
        for (locale, unit) in other.iter() {
            self.unit(locale).add_unit(unit);
        }
    }

    /// Merges another builder. Merging a builder into itself does nothing.
    pub fn merge_builder(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }
        let units: Vec<(String, Arc<MutableUnit>)> = other
            .units
            .lock()
            .iter()
            .map(|(locale, unit)| (locale.clone(), Arc::clone(unit)))
            .collect();
        for (locale, unit) in units {
            self.unit(&locale).add_mutable(&unit);
        }
    }

    pub fn locales(&self) -> Vec<String> {
        self.units.lock().keys().cloned().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.lock().is_empty()
    }

    /// Freezes the accumulated content.
    ///
    /// Units handed out by [`SnapshotBuilder::unit`] that are still alive are
    /// copied, so later writes through them do not reach the snapshot.
    #[must_use]
    pub fn build(self) -> Snapshot {
        self.units
            .into_inner()
            .into_iter()
            .map(|(locale, unit)| {
                let unit = Arc::try_unwrap(unit)
                    .map_or_else(|shared| shared.freeze(), MutableUnit::into_unit);
                (locale, unit)
            })
            .collect()
    }
}
