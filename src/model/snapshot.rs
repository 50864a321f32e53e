//! Translation snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use super::{
    SnapshotBuilder,
    TranslationUnit,
};

/// One loaded state: locale name → [`TranslationUnit`].
///
/// Cloning is cheap, units are shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Locale name (e.g. `en_us`) → unit
    units: HashMap<String, Arc<TranslationUnit>>,
}

impl Snapshot {
    #[must_use]
    pub fn new(units: HashMap<String, TranslationUnit>) -> Self {
        units.into_iter().collect()
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the unit of `locale`.
    #[must_use]
    pub fn get(&self, locale: &str) -> Option<&TranslationUnit> {
        self.units.get(locale).map(AsRef::as_ref)
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TranslationUnit)> {
        self.units.iter().map(|(locale, unit)| (locale.as_str(), unit.as_ref()))
    }

    /// Number of locales.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Total number of (locale, key) entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.units.values().map(|unit| unit.len()).sum()
    }

    /// Merges `snapshots` into a new snapshot.
    ///
    /// The fold runs strictly left to right, so for an identical
    /// (locale, key) pair the value of the later snapshot wins.
    #[must_use]
    pub fn merge_all<'a, I>(snapshots: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let builder = SnapshotBuilder::new();
        for snapshot in snapshots {
            builder.merge(snapshot);
        }
        builder.build()
    }
}

impl FromIterator<(String, TranslationUnit)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, TranslationUnit)>>(iter: I) -> Self {
        Self { units: iter.into_iter().map(|(locale, unit)| (locale, Arc::new(unit))).collect() }
    }
}
