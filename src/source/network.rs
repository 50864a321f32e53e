//! Source fetching translations from a remote translation API.
//!
//! The API takes a list of application names (and optionally locales) and
//! answers with every application's languages and their entries:
//!
//! ```json
//! [{"id": 1, "name": "app", "languages": [
//!     {"id": 7, "locale": "en_us", "entries": [{"key": "hello", "value": "Hello"}]}
//! ]}]
//! ```

use async_trait::async_trait;
use serde::{
    Deserialize,
    Serialize,
};

use super::{
    Source,
    SourceError,
};
use crate::model::{
    Snapshot,
    SnapshotBuilder,
};

/// Path of the translation endpoint, relative to the API base URL.
const TRANSLATIONS_PATH: &str = "api/translations/get";

/// Request body of the translation endpoint.
#[derive(Debug, Serialize)]
struct TranslationRequest<'a> {
    /// Applications to fetch
    applications: &'a [String],
    /// Locales to fetch; all locales when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    languages: Option<&'a [String]>,
}

/// One translation application.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationApplication {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub languages: Vec<TranslationLanguage>,
}

/// One language of an application.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationLanguage {
    pub id: i64,
    pub locale: String,
    #[serde(default)]
    pub entries: Vec<TranslationEntry>,
}

/// One key/value entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationEntry {
    pub key: String,
    pub value: String,
}

/// Loads translations of a set of applications from a remote API.
///
/// Any status other than `200 OK` fails the load.
#[derive(Debug, Clone)]
pub struct NetworkSource {
    /// HTTP client
    client: reqwest::Client,
    /// Base URL of the API (e.g. `https://example.com/`)
    endpoint: String,
    /// Applications to fetch
    applications: Vec<String>,
    /// Locales to fetch; `None` fetches every locale
    languages: Option<Vec<String>>,
}

impl NetworkSource {
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        applications: Vec<String>,
        languages: Option<Vec<String>>,
    ) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint, applications, languages)
    }

    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        applications: Vec<String>,
        languages: Option<Vec<String>>,
    ) -> Self {
        Self { client, endpoint: endpoint.into(), applications, languages }
    }

    /// Full URL of the translation endpoint.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}/{TRANSLATIONS_PATH}", self.endpoint.trim_end_matches('/'))
    }

    /// Request body sent to the endpoint.
    fn request(&self) -> TranslationRequest<'_> {
        TranslationRequest { applications: &self.applications, languages: self.languages.as_deref() }
    }
}

/// Folds the applications of an API response into a snapshot.
///
/// Applications and entries are applied in response order; a key present in
/// two applications keeps the value of the later one.
#[must_use]
pub fn snapshot_from_applications(applications: &[TranslationApplication]) -> Snapshot {
    let builder = SnapshotBuilder::new();
    for application in applications {
        for language in &application.languages {
            builder.unit(&language.locale).add_all(
                language.entries.iter().map(|entry| (entry.key.as_str(), entry.value.as_str())),
            );
        }
    }
    builder.build()
}

#[async_trait]
impl Source for NetworkSource {
    async fn load(&self) -> Result<Snapshot, SourceError> {
        let url = self.url();
        tracing::info!(
            applications = ?self.applications,
            languages = ?self.languages,
            "Fetching translations from {url}"
        );

        let response = self.client.post(&url).json(&self.request()).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(SourceError::HttpStatus { status: status.as_u16(), url });
        }

        let applications: Vec<TranslationApplication> = response.json().await?;
        let snapshot = snapshot_from_applications(&applications);
        tracing::info!(locales = snapshot.len(), "Loaded translations from network");
        Ok(snapshot)
    }
}
