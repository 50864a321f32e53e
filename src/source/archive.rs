//! Source reading JSON translation files from a zip or jar archive.
use std::fs::File;
use std::io::{
    BufReader,
    Read,
};
use std::path::{
    Path,
    PathBuf,
};

use async_trait::async_trait;
use zip::ZipArchive;

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

/// Loads every translation entry of a zip archive.
///
/// Entry paths are matched against the resource directories the same way
/// [`DirectorySource`](super::DirectorySource) matches file paths, and entries
/// are parsed in sorted path order. A missing or corrupt archive fails the
/// load; a single unreadable entry is logged and skipped.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    /// Archive file
    path: PathBuf,
    /// Which entries are translation files
    filter: ResourceFilter,
}

impl ArchiveSource {
    /// # Errors
    /// Returns an error if an exclude pattern is not a valid glob.
    pub fn new(
        path: impl Into<PathBuf>,
        resource_directories: &[String],
        exclude_patterns: &[String],
    ) -> Result<Self, SourceError> {
        Ok(Self { path: path.into(), filter: ResourceFilter::new(resource_directories, exclude_patterns)? })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the archive and parses the matching entries. Blocking.
    fn load_sync(&self) -> Result<Snapshot, SourceError> {
        let file = File::open(&self.path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        let mut names: Vec<String> = archive
            .file_names()
            .filter(|name| self.filter.is_translation_file(name))
            .map(ToString::to_string)
            .collect();
        names.sort();
        tracing::debug!(archive = %self.path.display(), count = names.len(), "Found translation entries");

        let builder = SnapshotBuilder::new();
        for name in &names {
            let json = match read_entry(&mut archive, name) {
                Ok(json) => json,
                Err(error) => {
                    tracing::error!(archive = %self.path.display(), entry = %name, %error, "Failed to read archive entry");
                    continue;
                }
            };
            if let Err(error) = parse_into(&builder, &json, locale_from_path(name)) {
                tracing::error!(archive = %self.path.display(), entry = %name, %error, "Invalid translation file");
            }
        }

        let snapshot = builder.build();
        tracing::info!(
            archive = %self.path.display(),
            locales = snapshot.len(),
            entries = snapshot.entry_count(),
            "Loaded translations from archive"
        );
        Ok(snapshot)
    }
}

/// Reads one entry as UTF-8 text.
fn read_entry<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<String, SourceError> {
    let mut entry = archive.by_name(name)?;
    let mut json = String::new();
    entry.read_to_string(&mut json)?;
    Ok(json)
}

#[async_trait]
impl Source for ArchiveSource {
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;
    use std::io::Write;

    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    use super::*;

    /// テスト用の zip アーカイブを作成する
    fn create_archive(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    fn source(path: &Path, excludes: &[&str]) -> ArchiveSource {
        let excludes: Vec<String> = excludes.iter().map(ToString::to_string).collect();
        ArchiveSource::new(path, &["lang/".to_string()], &excludes).unwrap()
    }

    #[tokio::test]
    async fn test_load_archive() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("translations.jar");
        create_archive(
            &path,
            &[
                ("lang/", ""),
                ("lang/en_us.json", r#"{"hello": "Hello"}"#),
                ("lang/de_de.json", r#"{"hello": "Hallo"}"#),
                ("other/fr_fr.json", r#"{"hello": "Bonjour"}"#),
                ("lang/readme.txt", "not a translation"),
            ],
        );

        let snapshot = source(&path, &[]).load().await.unwrap();

        let mut locales: Vec<_> = snapshot.locales().collect();
        locales.sort_unstable();
        assert_eq!(locales, vec!["de_de", "en_us"]);
        assert_eq!(snapshot.get("de_de").unwrap().get("hello"), Some("Hallo"));
    }

    #[tokio::test]
    async fn test_entries_are_parsed_in_path_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("translations.zip");
        create_archive(
            &path,
            &[
                ("lang/module/en_us.json", r#"{"a": "module"}"#),
                ("lang/en_us.json", r#"{"a": "base", "b": "B"}"#),
            ],
        );

        let snapshot = source(&path, &[]).load().await.unwrap();

        let unit = snapshot.get("en_us").unwrap();
        assert_eq!(unit.get("a"), Some("module"));
        assert_eq!(unit.get("b"), Some("B"));
    }

    #[tokio::test]
    async fn test_malformed_and_excluded_entries_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("translations.zip");
        create_archive(
            &path,
            &[
                ("lang/en_us.json", r#"{"hello": "Hello"}"#),
                ("lang/de_de.json", "{ invalid json"),
                ("lang/drafts/fr_fr.json", r#"{"hello": "Bonjour"}"#),
            ],
        );

        let snapshot = source(&path, &["lang/drafts/**"]).load().await.unwrap();

        assert_eq!(snapshot.locales().collect::<Vec<_>>(), vec!["en_us"]);
    }

    #[tokio::test]
    async fn test_missing_archive_fails() {
        let temp_dir = TempDir::new().unwrap();

        let result = source(&temp_dir.path().join("missing.zip"), &[]).load().await;

        assert!(matches!(result, Err(SourceError::Io(_))));
    }

    #[tokio::test]
    async fn test_corrupt_archive_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.zip");
        fs::write(&path, "this is not a zip file").unwrap();

        let result = source(&path, &[]).load().await;

        assert!(matches!(result, Err(SourceError::Archive(_))));
    }
}
