//! Reader-facing translation service.
//!
//! [`Translator`] は 1 つのトップレベル [`Source`] を所有し、最新の
//! [`Snapshot`] とロケールごとの日付フォーマットキャッシュを同じロックで保護します。
//! `reload` はスナップショットの差し替えとキャッシュのクリアを 1 つのクリティカル
//! セクションで行うため、読み取り側が古いスナップショット由来のフォーマットを
//! 新しいスナップショットと組み合わせて観測することはありません。

/// Date format patterns
pub mod date_format;
/// Positional substitution
pub mod substitution;

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::sync::atomic::{
    AtomicU64,
    Ordering,
};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{
    debug,
    info,
    warn,
};

pub use date_format::{
    DEFAULT_DATE_PATTERN,
    DateFormat,
    DateFormatError,
};
pub use substitution::format_template;

use crate::model::Snapshot;
use crate::source::{
    Source,
    SourceError,
    SourceHandle,
};

/// Locale used when none is configured.
pub const DEFAULT_LOCALE: &str = "en_us";

/// Key holding a locale's date pattern.
pub const DATE_FORMAT_KEY: &str = "date.format";

/// Errors produced by [`Translator`].
#[derive(Error, Debug)]
pub enum TranslatorError {
    /// Error when the default locale is empty
    #[error("Default locale must not be empty")]
    EmptyDefaultLocale,
    /// Error when the fallback date pattern cannot be parsed
    #[error("Invalid fallback date format: {0}")]
    InvalidDateFormat(#[from] DateFormatError),
    /// Error when the top-level source fails to load
    #[error("Failed to load translations: {0}")]
    Load(#[from] SourceError),
}

/// Lifecycle of a [`Translator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslatorStatus {
    /// No reload has completed yet
    Uninitialized,
    /// At least one reload has completed
    Ready,
}

/// Construction options for [`Translator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorOptions {
    /// Locale consulted when the requested locale has no translation
    pub default_locale: String,
    /// Date pattern used when no locale defines one
    pub fallback_date_format: String,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            fallback_date_format: DEFAULT_DATE_PATTERN.to_string(),
        }
    }
}

/// State swapped by `reload`.
#[derive(Debug)]
struct LiveState {
    /// Lifecycle state
    status: TranslatorStatus,
    /// Snapshot served to readers
    snapshot: Arc<Snapshot>,
    /// Reload generation that produced `snapshot`
    generation: u64,
    /// Resolved date formats keyed by requested locale
    date_formats: HashMap<String, DateFormat>,
}

/// Answers translation queries from the most recently loaded snapshot.
///
/// Queries never block on I/O and are safe to call while a reload is running.
#[derive(Debug)]
pub struct Translator {
    /// Top-level source loaded by `reload`
    source: SourceHandle,
    /// Second lookup step after the requested locale
    default_locale: String,
    /// Last date format candidate
    fallback_date_format: DateFormat,
    /// Snapshot and derived caches
    state: RwLock<LiveState>,
    /// Generation handed to the most recently started reload
    next_generation: AtomicU64,
}

impl Translator {
    /// Creates a translator with the default options. No data is loaded
    /// until [`Translator::reload`] is called.
    #[must_use]
    pub fn new(source: SourceHandle) -> Self {
        Self::build(source, DEFAULT_LOCALE.to_string(), DateFormat::default())
    }

    /// # Errors
    /// Returns an error if the default locale is empty or the fallback date
    /// pattern is invalid.
    pub fn with_options(
        source: SourceHandle,
        options: TranslatorOptions,
    ) -> Result<Self, TranslatorError> {
        if options.default_locale.is_empty() {
            return Err(TranslatorError::EmptyDefaultLocale);
        }
        let fallback = DateFormat::parse(&options.fallback_date_format)?;
        Ok(Self::build(source, options.default_locale, fallback))
    }

    /// Constructs a translator and performs the first reload.
    ///
    /// # Errors
    /// Returns an error if the options are invalid or the first load fails.
    pub async fn create(
        source: SourceHandle,
        options: TranslatorOptions,
    ) -> Result<Self, TranslatorError> {
        let translator = Self::with_options(source, options)?;
        translator.reload().await?;
        Ok(translator)
    }

    /// Assembles a translator in the `Uninitialized` state.
    fn build(source: SourceHandle, default_locale: String, fallback: DateFormat) -> Self {
        Self {
            source,
            default_locale,
            fallback_date_format: fallback,
            state: RwLock::new(LiveState {
                status: TranslatorStatus::Uninitialized,
                snapshot: Arc::new(Snapshot::empty()),
                generation: 0,
                date_formats: HashMap::new(),
            }),
            next_generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn status(&self) -> TranslatorStatus {
        self.state.read().status
    }

    #[must_use]
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    #[must_use]
    pub const fn source(&self) -> &SourceHandle {
        &self.source
    }

    /// Snapshot currently served to readers.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state.read().snapshot)
    }

    /// Looks up `key` for `locale`, falling back to the default locale and
    /// finally to the key itself. Found templates receive `substitutions`.
    #[must_use]
    pub fn translate(&self, locale: &str, key: &str, substitutions: &[&dyn Display]) -> String {
        let snapshot = self.snapshot();
        let template = snapshot
            .get(locale)
            .and_then(|unit| unit.get(key))
            .or_else(|| snapshot.get(&self.default_locale).and_then(|unit| unit.get(key)));

        match template {
            Some(template) => format_template(template, substitutions),
            None => {
                debug!(locale = %locale, key = %key, "Translation not found");
                key.to_string()
            }
        }
    }

    /// Whether `locale` itself defines `key`. The default locale is not consulted.
    #[must_use]
    pub fn has_translation(&self, locale: &str, key: &str) -> bool {
        self.state.read().snapshot.get(locale).is_some_and(|unit| unit.has(key))
    }

    /// Date format for `locale`.
    ///
    /// Candidates are the locale's `date.format`, the default locale's
    /// `date.format` and the fallback pattern. Invalid patterns are skipped.
    #[must_use]
    pub fn date_format(&self, locale: &str) -> DateFormat {
        if let Some(format) = self.state.read().date_formats.get(locale) {
            return format.clone();
        }

        let mut state = self.state.write();
        if let Some(format) = state.date_formats.get(locale) {
            return format.clone();
        }
        let format = self.resolve_date_format(&state.snapshot, locale);
        state.date_formats.insert(locale.to_string(), format.clone());
        format
    }

    /// Picks the first valid date pattern for `locale` from `snapshot`.
    fn resolve_date_format(&self, snapshot: &Snapshot, locale: &str) -> DateFormat {
        [locale, self.default_locale.as_str()]
            .into_iter()
            .filter_map(|candidate| {
                let pattern = snapshot.get(candidate)?.get(DATE_FORMAT_KEY)?;
                match DateFormat::parse(pattern) {
                    Ok(format) => Some(format),
                    Err(e) => {
                        warn!(locale = %candidate, pattern = %pattern, "Invalid date format: {e}");
                        None
                    }
                }
            })
            .next()
            .unwrap_or_else(|| self.fallback_date_format.clone())
    }

    /// Locales of the current snapshot, sorted.
    #[must_use]
    pub fn list_locales(&self) -> Vec<String> {
        let mut locales: Vec<String> =
            self.state.read().snapshot.locales().map(ToString::to_string).collect();
        locales.sort_unstable();
        locales
    }

    /// Loads the top-level source and publishes the result.
    ///
    /// Overlapping reloads publish in start order: a reload that finishes
    /// after a later-started one has already published is discarded.
    ///
    /// # Errors
    /// Returns an error if the source fails; the previous snapshot stays live.
    pub async fn reload(&self) -> Result<(), TranslatorError> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = self.source.source().load().await?;
        self.publish(generation, snapshot);
        Ok(())
    }

    /// Swaps the snapshot and clears derived state in one critical section.
    fn publish(&self, generation: u64, snapshot: Snapshot) {
        let locales = snapshot.len();
        let entries = snapshot.entry_count();

        let mut state = self.state.write();
        if generation < state.generation {
            drop(state);
            debug!(generation, "Discarding result of a superseded reload");
            return;
        }
        state.generation = generation;
        state.snapshot = Arc::new(snapshot);
        state.date_formats.clear();
        state.status = TranslatorStatus::Ready;
        drop(state);

        info!(locales, entries, "Translations reloaded");
    }
}
