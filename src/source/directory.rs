//! Source reading JSON translation files from a directory tree.
use std::path::{
    Path,
    PathBuf,
};

use async_trait::async_trait;
use ignore::WalkBuilder;

use super::{
    Source,
    SourceError,
};
use crate::input::json::parse_into;
use crate::input::resource::{
    ResourceFilter,
    locale_from_path,
};
use crate::model::{
    Snapshot,
    SnapshotBuilder,
};

/// Loads every translation file below a root directory.
///
/// File names minus extension are the locale names. Files are parsed in
/// sorted path order, so the result does not depend on directory iteration
/// order. Unreadable or malformed files are logged and skipped.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    /// Root directory
    root: PathBuf,
    /// Which files below `root` are translation files
    filter: ResourceFilter,
}

impl DirectorySource {
    /// # Errors
    /// Returns an error if an exclude pattern is not a valid glob.
    pub fn new(
        root: impl Into<PathBuf>,
        resource_directories: &[String],
        exclude_patterns: &[String],
    ) -> Result<Self, SourceError> {
        Ok(Self { root: root.into(), filter: ResourceFilter::new(resource_directories, exclude_patterns)? })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walks the tree and parses the files. Blocking.
    fn load_sync(&self) -> Result<Snapshot, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::NotADirectory(self.root.display().to_string()));
        }

        let files = self.find_translation_files();
        tracing::debug!(root = %self.root.display(), count = files.len(), "Found translation files");

        let builder = SnapshotBuilder::new();
        for (relative, path) in &files {
            Self::read_file(&builder, relative, path);
        }

        let snapshot = builder.build();
        tracing::info!(
            root = %self.root.display(),
            locales = snapshot.len(),
            entries = snapshot.entry_count(),
            "Loaded translations from directory"
        );
        Ok(snapshot)
    }

    /// Collects (relative path, absolute path) of every translation file, sorted.
    fn find_translation_files(&self) -> Vec<(String, PathBuf)> {
        let mut found_files = Vec::new();

        for result in WalkBuilder::new(&self.root)
            .hidden(false)
            .ignore(false)
            .parents(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .follow_links(false)
            .max_depth(Some(256))
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let Ok(relative_path) = path.strip_prefix(&self.root) else {
                continue;
            };
            if !self.filter.matches_path(relative_path) {
                continue;
            }

            let relative = relative_path
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            found_files.push((relative, path.to_path_buf()));
        }

        found_files.sort();
        found_files
    }

    /// Parses one file into `builder`; failures are logged, never returned.
    fn read_file(builder: &SnapshotBuilder, relative: &str, path: &Path) {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(error) => {
                tracing::error!(path = %path.display(), %error, "Failed to read translation file");
                return;
            }
        };

        let locale = locale_from_path(relative);
        tracing::debug!(path = %path.display(), locale, "Reading translation file");
        if let Err(error) = parse_into(builder, &json, locale) {
            tracing::error!(path = %path.display(), %error, "Invalid translation file");
        }
    }
}

#[async_trait]
impl Source for DirectorySource {
    async fn load(&self) -> Result<Snapshot, SourceError> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || source.load_sync()).await.map_err(|error| {
            if error.is_panic() {
                SourceError::Panicked(error.to_string())
            } else {
                SourceError::Cancelled
            }
        })?
    }
}
