//! Translation units.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Immutable key → localized string mapping for exactly one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationUnit {
    /// Translation key → template
    entries: HashMap<String, String>,
}

impl TranslationUnit {
    #[must_use]
    pub const fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Returns the template stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TranslationUnit
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
    }
}

/// Unit under construction.
///
/// All operations take `&self`; concurrent writers are serialized by a
/// per-unit lock and the last write for a key wins.
#[derive(Debug, Default)]
pub struct MutableUnit {
    /// Translation key → template
    entries: Mutex<HashMap<String, String>>,
}

impl MutableUnit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.lock().insert(key.into(), value.into());
    }

    /// Adds every pair, overwriting existing keys.
    pub fn add_all<I, K, V>(&self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries = self.entries.lock();
        for (key, value) in pairs {
            entries.insert(key.into(), value.into());
        }
    }

    pub fn add_unit(&self, unit: &TranslationUnit) {
        self.add_all(unit.iter());
    }

    /// Adds every entry of `other`. Adding a unit to itself does nothing.
    pub fn add_mutable(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }
        // copy first so the two unit locks are never held together
        let pairs = other.entries.lock().clone();
        self.add_all(pairs);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copies the current content into an immutable unit.
    #[must_use]
    pub fn freeze(&self) -> TranslationUnit {
        TranslationUnit::new(self.entries.lock().clone())
    }

    #[must_use]
    pub fn into_unit(self) -> TranslationUnit {
        TranslationUnit::new(self.entries.into_inner())
    }
}
