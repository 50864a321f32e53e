use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::translator::{
    DEFAULT_DATE_PATTERN,
    DEFAULT_LOCALE,
    DateFormat,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "sources[1].endpoint")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to build source: {0}")]
    SourceError(#[from] crate::source::SourceError),

    #[error("Failed to register source: {0}")]
    RegistrationError(#[from] crate::source::RegistrationError),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationSettings {
    /// Locale consulted when the requested locale has no translation.
    pub default_locale: String,

    /// `SimpleDateFormat`-style pattern used when no locale defines `date.format`.
    pub fallback_date_format: String,

    /// Wrap the configured sources in a caching loader.
    ///
    /// Cached sources are loaded once; later reloads reuse their snapshot.
    pub cache: bool,

    /// Append the process-wide provider registry as the last source.
    pub include_registry: bool,

    /// Sources in precedence order. Later sources win on overlapping keys.
    pub sources: Vec<SourceConfig>,

    pub loading: LoadingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SourceConfig {
    #[serde(rename_all = "camelCase")]
    Directory {
        /// Root directory, relative to the workspace root unless absolute.
        path: String,
        /// Path prefixes (relative to `path`) that may hold translation files.
        /// Empty means the whole tree.
        #[serde(default)]
        resource_directories: Vec<String>,
        #[serde(default)]
        exclude_patterns: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Archive {
        /// Zip or jar file, relative to the workspace root unless absolute.
        path: String,
        /// Entry path prefixes that may hold translation files.
        /// Empty means every entry.
        #[serde(default)]
        resource_directories: Vec<String>,
        #[serde(default)]
        exclude_patterns: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Network {
        /// Base URL of the translation service.
        endpoint: String,
        applications: Vec<String>,
        /// All languages when unset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        languages: Option<Vec<String>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadingConfig {
    /// Worker thread count for the loading runtime.
    /// Default: 80% of CPU cores (minimum 1).
    pub num_threads: Option<usize>,
}

impl LoadingConfig {
    /// Effective worker thread count.
    #[must_use]
    pub fn worker_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| (num_cpus::get() * 4 / 5).max(1))
    }
}

impl TranslationSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid date pattern
    /// - Invalid glob pattern
    /// - Invalid source definition
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.default_locale.is_empty() {
            errors.push(ValidationError::new(
                "defaultLocale",
                "The locale cannot be empty. Example: \"en_us\"",
            ));
        }

        if let Err(e) = DateFormat::parse(&self.fallback_date_format) {
            errors.push(ValidationError::new(
                "fallbackDateFormat",
                format!("Invalid date pattern '{}': {e}", self.fallback_date_format),
            ));
        }

        for (index, source) in self.sources.iter().enumerate() {
            source.validate(&format!("sources[{index}]"), &mut errors);
        }

        if self.loading.num_threads == Some(0) {
            errors.push(ValidationError::new(
                "loading.numThreads",
                "At least one thread is required. Remove this field to use the default",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl SourceConfig {
    fn validate(&self, path: &str, errors: &mut Vec<ValidationError>) {
        match self {
            Self::Directory { path: root, exclude_patterns, .. }
            | Self::Archive { path: root, exclude_patterns, .. } => {
                if root.is_empty() {
                    errors.push(ValidationError::new(
                        format!("{path}.path"),
                        "The path cannot be empty. Example: \"locales\"",
                    ));
                }
                for (index, pattern) in exclude_patterns.iter().enumerate() {
                    if let Err(e) = globset::Glob::new(pattern) {
                        errors.push(ValidationError::new(
                            format!("{path}.excludePatterns[{index}]"),
                            format!("Invalid glob pattern '{pattern}': {e}"),
                        ));
                    }
                }
            }
            Self::Network { endpoint, applications, .. } => {
                if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                    errors.push(ValidationError::new(
                        format!("{path}.endpoint"),
                        format!("Expected an http(s) URL, got '{endpoint}'"),
                    ));
                }
                if applications.is_empty() {
                    errors.push(ValidationError::new(
                        format!("{path}.applications"),
                        "At least one application is required",
                    ));
                }
            }
        }
    }
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            fallback_date_format: DEFAULT_DATE_PATTERN.to_string(),
            cache: true,
            include_registry: false,
            sources: Vec::new(),
            loading: LoadingConfig::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn directory(path: &str) -> SourceConfig {
        SourceConfig::Directory {
            path: path.to_string(),
            resource_directories: vec![],
            exclude_patterns: vec![],
        }
    }

    #[rstest]
    fn validate_valid_settings() {
        let settings = TranslationSettings::default();

        assert_that!(settings.validate(), ok(anything()));
    }

    #[rstest]
    fn deserialize_empty_settings() {
        let settings: TranslationSettings = serde_json::from_str("{}").unwrap();

        assert_that!(settings.default_locale, eq("en_us"));
        assert_that!(settings.fallback_date_format, eq("MM/dd/yyyy hh:mm a"));
        assert_that!(settings.cache, eq(true));
        assert_that!(settings.include_registry, eq(false));
        assert_that!(settings.sources, is_empty());
        assert_that!(settings.loading.num_threads, none());
    }

    #[rstest]
    fn deserialize_sources() {
        let json = r#"{
            "defaultLocale": "de_de",
            "sources": [
                {"type": "directory", "path": "locales", "resourceDirectories": ["app"]},
                {"type": "network", "endpoint": "https://i18n.example.com", "applications": ["web"]}
            ],
            "loading": {"numThreads": 2}
        }"#;

        let settings: TranslationSettings = serde_json::from_str(json).unwrap();

        assert_that!(settings.default_locale, eq("de_de"));
        assert_that!(settings.sources, len(eq(2)));
        assert_eq!(
            settings.sources[0],
            SourceConfig::Directory {
                path: "locales".to_string(),
                resource_directories: vec!["app".to_string()],
                exclude_patterns: vec![],
            }
        );
        assert_eq!(
            settings.sources[1],
            SourceConfig::Network {
                endpoint: "https://i18n.example.com".to_string(),
                applications: vec!["web".to_string()],
                languages: None,
            }
        );
        assert_that!(settings.loading.worker_threads(), eq(2));
    }

    #[rstest]
    fn deserialize_archive_source() {
        let json = r#"{"sources": [{"type": "archive", "path": "plugins/bundle.jar", "resourceDirectories": ["lang/"]}]}"#;

        let settings: TranslationSettings = serde_json::from_str(json).unwrap();

        assert_eq!(
            settings.sources,
            vec![SourceConfig::Archive {
                path: "plugins/bundle.jar".to_string(),
                resource_directories: vec!["lang/".to_string()],
                exclude_patterns: vec![],
            }]
        );
    }

    #[rstest]
    fn validate_invalid_archive_source() {
        let settings = TranslationSettings {
            sources: vec![SourceConfig::Archive {
                path: String::new(),
                resource_directories: vec![],
                exclude_patterns: vec![],
            }],
            ..TranslationSettings::default()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![field!(ValidationError.field_path, eq("sources[0].path"))])
        );
    }

    #[rstest]
    fn deserialize_unknown_source_type() {
        let json = r#"{"sources": [{"type": "classpath", "path": "lang"}]}"#;

        let result = serde_json::from_str::<TranslationSettings>(json);

        assert!(result.is_err());
    }

    #[rstest]
    fn default_worker_threads_is_positive() {
        assert_that!(LoadingConfig::default().worker_threads(), ge(1));
    }

    #[rstest]
    fn validate_invalid_default_locale_empty() {
        let settings =
            TranslationSettings { default_locale: String::new(), ..TranslationSettings::default() };

        assert_that!(
            settings.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("defaultLocale")),
                field!(ValidationError.message, contains_substring("cannot be empty"))
            ]])
        );
    }

    #[rstest]
    fn validate_invalid_fallback_date_format() {
        let settings = TranslationSettings {
            fallback_date_format: "yyyy-MM-dd 'at".to_string(),
            ..TranslationSettings::default()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("fallbackDateFormat")),
                field!(ValidationError.message, contains_substring("Invalid date pattern"))
            ]])
        );
    }

    #[rstest]
    fn validate_invalid_sources() {
        let settings = TranslationSettings {
            sources: vec![
                directory("locales"),
                SourceConfig::Network {
                    endpoint: "ftp://i18n.example.com".to_string(),
                    applications: vec![],
                    languages: None,
                },
                SourceConfig::Directory {
                    path: String::new(),
                    resource_directories: vec![],
                    exclude_patterns: vec!["invalid[pattern".to_string()],
                },
            ],
            ..TranslationSettings::default()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![
                field!(ValidationError.field_path, eq("sources[1].endpoint")),
                field!(ValidationError.field_path, eq("sources[1].applications")),
                field!(ValidationError.field_path, eq("sources[2].path")),
                all![
                    field!(ValidationError.field_path, eq("sources[2].excludePatterns[0]")),
                    field!(ValidationError.message, contains_substring("invalid[pattern"))
                ]
            ])
        );
    }

    #[rstest]
    fn validate_invalid_num_threads() {
        let settings = TranslationSettings {
            loading: LoadingConfig { num_threads: Some(0) },
            ..TranslationSettings::default()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![field!(ValidationError.field_path, eq("loading.numThreads"))])
        );
    }

    #[rstest]
    fn config_error_validation_errors_format() {
        let settings = TranslationSettings {
            default_locale: String::new(),
            fallback_date_format: "qq".to_string(),
            ..TranslationSettings::default()
        };

        let errors = settings.validate().unwrap_err();
        let config_error = ConfigError::ValidationErrors(errors);

        let error_message = format!("{config_error}");
        assert_that!(error_message, contains_substring("Configuration validation failed"));
        assert_that!(error_message, contains_substring("1. defaultLocale"));
        assert_that!(error_message, contains_substring("2. fallbackDateFormat"));
    }
}
