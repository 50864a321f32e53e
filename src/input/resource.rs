//! Translation resource naming and filtering.

use std::path::Path;

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};

use crate::source::SourceError;

/// Derives the locale name from a resource path.
///
/// The trailing path component without its last extension is the locale.
///
/// # Examples
/// - `lang/en_us.json` → `en_us`
/// - `assets/lang/de_de.json` → `de_de`
/// - `lang/en_us.backup.json` → `en_us.backup`
/// - `lang/README` → `README`
#[must_use]
pub fn locale_from_path(path: &str) -> &str {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((stem, _extension)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// Decides which files below a base location are translation files.
///
/// A file qualifies when its path, relative to the base and using `/` as
/// separator, ends in `.json`, starts with one of the resource directories
/// and matches none of the exclude patterns. Without resource directories
/// the whole tree qualifies.
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    /// Accepted path prefixes (e.g. `lang/`)
    resource_directories: Vec<String>,
    /// Excluded paths
    exclude: GlobSet,
}

impl ResourceFilter {
    /// # Errors
    /// Returns an error if an exclude pattern is not a valid glob.
    pub fn new(
        resource_directories: &[String],
        exclude_patterns: &[String],
    ) -> Result<Self, SourceError> {
        let mut exclude_builder = GlobSetBuilder::new();
        for pattern in exclude_patterns {
            exclude_builder.add(Glob::new(pattern)?);
        }

        Ok(Self {
            resource_directories: resource_directories.to_vec(),
            exclude: exclude_builder.build()?,
        })
    }

    /// Checks a `/`-separated relative path.
    #[must_use]
    pub fn is_translation_file(&self, relative_path: &str) -> bool {
        if !relative_path.ends_with(".json") {
            return false;
        }
        if !self.resource_directories.is_empty()
            && !self.resource_directories.iter().any(|directory| relative_path.starts_with(directory))
        {
            return false;
        }
        !self.exclude.is_match(relative_path)
    }

    /// Normalizes `relative_path` to `/` separators and checks it.
    #[must_use]
    pub fn matches_path(&self, relative_path: &Path) -> bool {
        let normalized = relative_path
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        self.is_translation_file(&normalized)
    }
}
