//! Catalog sources: the remote translation API and the bundled JSON files.
//!
//! Each language is resolved remote-first. Any remote failure falls through to
//! the bundled file for the same language, with no retry of the remote within
//! the same call. Loading every language runs one such resolution per language
//! concurrently and waits for all of them, whatever their outcome.

use crate::config::Config;
use crate::i18n::{Catalog, I18nError, I18nResult, Language, LocaleState, SourceError};
use anyhow::{Context, Result};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Response envelope of the translation API.
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Which source a catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogOrigin {
    Remote,
    Bundle,
}

#[derive(Debug)]
pub struct ResolvedCatalog {
    pub catalog: Catalog,
    pub origin: CatalogOrigin,
}

/// Client for `GET <api_base>translations-json?lang=<code>`.
#[derive(Debug, Clone)]
pub struct RemoteCatalogs {
    client: reqwest::Client,
    api_base: String,
}

impl RemoteCatalogs {
    pub fn new(client: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}translations-json", self.api_base)
    }

    pub async fn fetch(&self, language: Language) -> Result<Catalog, SourceError> {
        let response = self
            .client
            .get(self.endpoint())
            .query(&[("lang", language.code())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { status });
        }

        let body = response.text().await?;
        let envelope: Envelope = serde_json::from_str(&body)?;
        if !envelope.success {
            return Err(SourceError::Rejected {
                message: envelope
                    .message
                    .unwrap_or_else(|| "no message".to_string()),
            });
        }

        catalog_from_payload(envelope.data)
    }
}

/// A successful envelope must still carry a non-empty catalog; anything else
/// counts as a remote failure so the bundled file gets a chance.
fn catalog_from_payload(data: Option<Value>) -> Result<Catalog, SourceError> {
    let data = match data {
        None | Some(Value::Null) => return Err(SourceError::EmptyPayload),
        // An empty result set is encoded as `[]` by the API.
        Some(Value::Array(items)) if items.is_empty() => return Err(SourceError::EmptyPayload),
        Some(data) => data,
    };

    let catalog = Catalog::try_from(data)?;
    if catalog.is_empty() {
        return Err(SourceError::EmptyPayload);
    }
    Ok(catalog)
}

/// Catalog files shipped with the site, one `<code>.json` per language.
#[derive(Debug, Clone)]
pub struct BundledCatalogs {
    dir: PathBuf,
}

impl BundledCatalogs {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, language: Language) -> PathBuf {
        self.dir.join(format!("{}.json", language.code()))
    }

    pub async fn fetch(&self, language: Language) -> Result<Catalog, SourceError> {
        let path = self.path_for(language);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| SourceError::Io { path, source })?;
        Ok(Catalog::from_json_str(&content)?)
    }
}

/// Outcome of loading every supported language.
#[derive(Debug, Default, Serialize)]
pub struct LoadReport {
    /// Languages that got a catalog, in registry order
    pub loaded: Vec<(Language, CatalogOrigin)>,

    /// Languages for which both sources failed, with the combined error
    pub failed: Vec<(Language, String)>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn origin(&self, language: Language) -> Option<CatalogOrigin> {
        self.loaded
            .iter()
            .find(|(loaded, _)| *loaded == language)
            .map(|(_, origin)| *origin)
    }

    pub fn is_failed(&self, language: Language) -> bool {
        self.failed.iter().any(|(failed, _)| *failed == language)
    }
}

/// Remote-first, bundle-fallback catalog resolution.
#[derive(Debug, Clone)]
pub struct TranslationSource {
    remote: RemoteCatalogs,
    bundle: BundledCatalogs,
}

impl TranslationSource {
    pub fn new(remote: RemoteCatalogs, bundle: BundledCatalogs) -> Self {
        Self { remote, bundle }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.remote_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self::new(
            RemoteCatalogs::new(client, config.api_base.clone()),
            BundledCatalogs::new(config.bundle_dir.clone()),
        ))
    }

    /// Resolve one language. Fails only when both sources fail.
    pub async fn resolve(&self, language: Language) -> I18nResult<ResolvedCatalog> {
        let remote_error = match self.remote.fetch(language).await {
            Ok(catalog) => {
                return Ok(ResolvedCatalog {
                    catalog,
                    origin: CatalogOrigin::Remote,
                })
            }
            Err(e) => e,
        };
        warn!(
            "Remote catalog for {} unavailable ({}), trying {}",
            language,
            remote_error,
            self.bundle.path_for(language).display()
        );

        match self.bundle.fetch(language).await {
            Ok(catalog) => Ok(ResolvedCatalog {
                catalog,
                origin: CatalogOrigin::Bundle,
            }),
            Err(bundle_error) => Err(I18nError::Unavailable {
                language: language.code(),
                remote: remote_error,
                bundle: bundle_error,
            }),
        }
    }

    /// Resolve and install every supported language concurrently.
    ///
    /// Each catalog is installed as soon as its own resolution finishes. The
    /// call returns once every language has either a catalog or two failed
    /// attempts; one language failing never cancels or fails the others.
    pub async fn load_all(&self, state: &LocaleState) -> LoadReport {
        let languages = Language::all();
        info!("Loading catalogs for {} languages", languages.len());

        let outcomes = join_all(languages.into_iter().map(|language| async move {
            let outcome = self.resolve(language).await;
            (language, settle(state, language, outcome))
        }))
        .await;

        let mut report = LoadReport::default();
        for (language, outcome) in outcomes {
            match outcome {
                Ok(origin) => report.loaded.push((language, origin)),
                Err(e) => report.failed.push((language, e.to_string())),
            }
        }

        info!(
            "Catalog load complete: {} loaded, {} failed",
            report.loaded.len(),
            report.failed.len()
        );
        report
    }

    /// Re-resolve one language. On failure the previously installed catalog,
    /// if any, stays in place.
    pub async fn reload(&self, state: &LocaleState, language: Language) -> I18nResult<CatalogOrigin> {
        debug!("Reloading catalog for {}", language);
        let outcome = self.resolve(language).await;
        settle(state, language, outcome)
    }
}

/// Install a resolved catalog and account for the outcome.
fn settle(
    state: &LocaleState,
    language: Language,
    outcome: I18nResult<ResolvedCatalog>,
) -> I18nResult<CatalogOrigin> {
    match outcome {
        Ok(ResolvedCatalog { catalog, origin }) => {
            match origin {
                CatalogOrigin::Remote => state.metrics().record_remote_load(),
                CatalogOrigin::Bundle => state.metrics().record_bundle_fallback(),
            }
            info!("✓ {} catalog loaded from {:?}", language, origin);
            state.install_catalog(language, catalog);
            Ok(origin)
        }
        Err(e) => {
            state.metrics().record_load_failure();
            error!("✗ {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn envelope(data: Value) -> Value {
        json!({ "success": true, "message": "OK", "data": data })
    }

    async fn mount_catalog(server: &MockServer, code: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/api/translations-json"))
            .and(query_param("lang", code))
            .respond_with(response)
            .mount(server)
            .await;
    }

    fn source(server: &MockServer, bundle: &TempDir) -> TranslationSource {
        TranslationSource::new(
            RemoteCatalogs::new(reqwest::Client::new(), format!("{}/api/", server.uri())),
            BundledCatalogs::new(bundle.path()),
        )
    }

    fn write_bundle(dir: &TempDir, code: &str, content: &str) {
        std::fs::write(dir.path().join(format!("{}.json", code)), content).unwrap();
    }

    // ==================== Remote Tests ====================

    #[tokio::test]
    async fn test_remote_success() {
        let server = MockServer::start().await;
        mount_catalog(
            &server,
            "tr",
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({ "nav": { "services": "Hizmetler" } }))),
        )
        .await;

        let remote = RemoteCatalogs::new(reqwest::Client::new(), format!("{}/api/", server.uri()));
        let catalog = remote.fetch(Language::TURKISH).await.expect("Should succeed");
        assert_eq!(catalog.lookup("nav.services"), Some("Hizmetler"));
    }

    #[tokio::test]
    async fn test_remote_query_style_base() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/index.php"))
            .and(query_param("url", "translations-json"))
            .and(query_param("lang", "en"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(json!({ "nav": { "home": "Home" } }))),
            )
            .mount(&server)
            .await;

        let remote = RemoteCatalogs::new(
            reqwest::Client::new(),
            format!("{}/api/index.php?url=", server.uri()),
        );
        let catalog = remote.fetch(Language::ENGLISH).await.expect("Should succeed");
        assert_eq!(catalog.lookup("nav.home"), Some("Home"));
    }

    #[tokio::test]
    async fn test_remote_non_success_status() {
        let server = MockServer::start().await;
        mount_catalog(&server, "tr", ResponseTemplate::new(500)).await;

        let remote = RemoteCatalogs::new(reqwest::Client::new(), format!("{}/api/", server.uri()));
        let err = remote.fetch(Language::TURKISH).await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status } if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn test_remote_success_false() {
        let server = MockServer::start().await;
        mount_catalog(
            &server,
            "tr",
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "message": "Veritabanı hatası", "data": null })),
        )
        .await;

        let remote = RemoteCatalogs::new(reqwest::Client::new(), format!("{}/api/", server.uri()));
        let err = remote.fetch(Language::TURKISH).await.unwrap_err();
        assert!(matches!(err, SourceError::Rejected { ref message } if message == "Veritabanı hatası"));
    }

    #[tokio::test]
    async fn test_remote_unparsable_body() {
        let server = MockServer::start().await;
        mount_catalog(&server, "tr", ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

        let remote = RemoteCatalogs::new(reqwest::Client::new(), format!("{}/api/", server.uri()));
        let err = remote.fetch(Language::TURKISH).await.unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[tokio::test]
    async fn test_remote_success_without_data_is_failure() {
        for body in [
            json!({ "success": true }),
            json!({ "success": true, "data": null }),
            json!({ "success": true, "data": [] }),
            json!({ "success": true, "data": {} }),
        ] {
            let server = MockServer::start().await;
            mount_catalog(&server, "tr", ResponseTemplate::new(200).set_body_json(body.clone())).await;

            let remote =
                RemoteCatalogs::new(reqwest::Client::new(), format!("{}/api/", server.uri()));
            let err = remote.fetch(Language::TURKISH).await.unwrap_err();
            assert!(matches!(err, SourceError::EmptyPayload), "body {} gave {:?}", body, err);
        }
    }

    #[tokio::test]
    async fn test_remote_data_of_wrong_shape() {
        let server = MockServer::start().await;
        mount_catalog(
            &server,
            "tr",
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": "nav" })),
        )
        .await;

        let remote = RemoteCatalogs::new(reqwest::Client::new(), format!("{}/api/", server.uri()));
        let err = remote.fetch(Language::TURKISH).await.unwrap_err();
        assert!(matches!(err, SourceError::Shape(_)));
    }

    // ==================== Bundle Tests ====================

    #[tokio::test]
    async fn test_bundle_reads_raw_catalog() {
        let dir = TempDir::new().unwrap();
        write_bundle(&dir, "ru", r#"{"nav": {"services": "Услуги"}}"#);

        let catalog = BundledCatalogs::new(dir.path())
            .fetch(Language::RUSSIAN)
            .await
            .unwrap();
        assert_eq!(catalog.lookup("nav.services"), Some("Услуги"));
    }

    #[tokio::test]
    async fn test_bundle_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = BundledCatalogs::new(dir.path())
            .fetch(Language::ARABIC)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Io { ref path, .. } if path.ends_with("ar.json")));
    }

    #[tokio::test]
    async fn test_bundle_invalid_json() {
        let dir = TempDir::new().unwrap();
        write_bundle(&dir, "ar", "{ not json");
        let err = BundledCatalogs::new(dir.path())
            .fetch(Language::ARABIC)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    // ==================== Resolve Tests ====================

    #[tokio::test]
    async fn test_resolve_prefers_remote() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_catalog(
            &server,
            "en",
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "nav": { "home": "Home (api)" } }))),
        )
        .await;
        write_bundle(&dir, "en", r#"{"nav": {"home": "Home (bundle)"}}"#);

        let resolved = source(&server, &dir).resolve(Language::ENGLISH).await.unwrap();
        assert_eq!(resolved.origin, CatalogOrigin::Remote);
        assert_eq!(resolved.catalog.lookup("nav.home"), Some("Home (api)"));
    }

    #[tokio::test]
    async fn test_resolve_falls_back_without_retrying_remote() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        Mock::given(method("GET"))
            .and(path("/api/translations-json"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;
        write_bundle(&dir, "en", r#"{"nav": {"home": "Home (bundle)"}}"#);

        let resolved = source(&server, &dir).resolve(Language::ENGLISH).await.unwrap();
        assert_eq!(resolved.origin, CatalogOrigin::Bundle);
        assert_eq!(resolved.catalog.lookup("nav.home"), Some("Home (bundle)"));
    }

    #[tokio::test]
    async fn test_resolve_both_fail() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_catalog(&server, "ar", ResponseTemplate::new(404)).await;

        let err = source(&server, &dir).resolve(Language::ARABIC).await.unwrap_err();
        match err {
            I18nError::Unavailable {
                language,
                remote,
                bundle,
            } => {
                assert_eq!(language, "ar");
                assert!(matches!(remote, SourceError::Status { .. }));
                assert!(matches!(bundle, SourceError::Io { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    // ==================== Load All Tests ====================

    #[tokio::test]
    async fn test_load_all_settles_every_language() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        // tr: remote ok; en: remote fails, bundle ok; ar: both fail; ru: remote ok
        mount_catalog(
            &server,
            "tr",
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "nav": { "services": "Hizmetler" } }))),
        )
        .await;
        mount_catalog(&server, "en", ResponseTemplate::new(500)).await;
        write_bundle(&dir, "en", r#"{"nav": {"services": "Services"}}"#);
        mount_catalog(
            &server,
            "ar",
            ResponseTemplate::new(200).set_body_json(json!({ "success": false, "message": "down" })),
        )
        .await;
        mount_catalog(
            &server,
            "ru",
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "nav": { "services": "Услуги" } }))),
        )
        .await;

        let state = LocaleState::new(Arc::new(MemoryStore::new()));
        let report = source(&server, &dir).load_all(&state).await;

        assert_eq!(report.origin(Language::TURKISH), Some(CatalogOrigin::Remote));
        assert_eq!(report.origin(Language::ENGLISH), Some(CatalogOrigin::Bundle));
        assert_eq!(report.origin(Language::RUSSIAN), Some(CatalogOrigin::Remote));
        assert!(report.is_failed(Language::ARABIC));
        assert!(!report.is_complete());

        assert_eq!(
            state.loaded_languages(),
            vec![Language::TURKISH, Language::ENGLISH, Language::RUSSIAN]
        );
        assert!(state.catalog(Language::ARABIC).is_none());

        let metrics = state.metrics();
        assert_eq!(metrics.remote_loads(), 2);
        assert_eq!(metrics.bundle_fallbacks(), 1);
        assert_eq!(metrics.load_failures(), 1);
    }

    #[tokio::test]
    async fn test_load_all_overlaps_remote_requests() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let delay = Duration::from_millis(800);
        for language in Language::all() {
            mount_catalog(
                &server,
                language.code(),
                ResponseTemplate::new(200)
                    .set_body_json(envelope(json!({ "nav": { "services": language.code() } })))
                    .set_delay(delay),
            )
            .await;
        }

        let state = LocaleState::new(Arc::new(MemoryStore::new()));
        let started = Instant::now();
        let report = source(&server, &dir).load_all(&state).await;
        let elapsed = started.elapsed();

        assert!(report.is_complete());
        assert_eq!(report.loaded.len(), 4);
        // One after another would take four delays.
        assert!(elapsed < delay * 2, "load took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_slow_language_does_not_hold_back_others() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_catalog(
            &server,
            "tr",
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "nav": { "services": "Hizmetler" } }))),
        )
        .await;
        mount_catalog(
            &server,
            "ar",
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({ "nav": { "services": "خدماتنا" } })))
                .set_delay(Duration::from_millis(1500)),
        )
        .await;

        let state = LocaleState::new(Arc::new(MemoryStore::new()));
        let source = source(&server, &dir);
        let (report, (turkish_early, arabic_early)) = futures::join!(source.load_all(&state), async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            (
                state.catalog(Language::TURKISH).is_some(),
                state.catalog(Language::ARABIC).is_some(),
            )
        });

        assert!(turkish_early);
        assert!(!arabic_early);
        assert_eq!(report.origin(Language::ARABIC), Some(CatalogOrigin::Remote));
    }

    #[tokio::test]
    async fn test_load_all_with_nothing_available() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let state = LocaleState::new(Arc::new(MemoryStore::new()));

        let report = source(&server, &dir).load_all(&state).await;

        assert!(report.loaded.is_empty());
        assert_eq!(report.failed.len(), 4);
        assert_eq!(state.translate("nav.services"), "nav.services");
    }

    #[tokio::test]
    async fn test_reload_failure_keeps_previous_catalog() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let state = LocaleState::new(Arc::new(MemoryStore::new()));
        state.install_catalog(
            Language::TURKISH,
            Catalog::from_flat_entries([("nav.services", "Hizmetler")]),
        );

        let result = source(&server, &dir).reload(&state, Language::TURKISH).await;

        assert!(result.is_err());
        assert_eq!(state.translate("nav.services"), "Hizmetler");
    }

    #[tokio::test]
    async fn test_reload_replaces_catalog() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        write_bundle(&dir, "tr", r#"{"nav": {"services": "Hizmetlerimiz"}}"#);
        let state = LocaleState::new(Arc::new(MemoryStore::new()));
        state.install_catalog(
            Language::TURKISH,
            Catalog::from_flat_entries([("nav.services", "Hizmetler")]),
        );

        let origin = source(&server, &dir)
            .reload(&state, Language::TURKISH)
            .await
            .unwrap();

        assert_eq!(origin, CatalogOrigin::Bundle);
        assert_eq!(state.translate("nav.services"), "Hizmetlerimiz");
    }

    #[test]
    fn test_from_config_builds_sources() {
        let config = Config {
            api_base: "http://localhost:9/api/".to_string(),
            bundle_dir: PathBuf::from("i18n"),
            state_file: PathBuf::from("prefs.json"),
            page_manifest: None,
            remote_timeout: Some(std::time::Duration::from_secs(2)),
        };

        let source = TranslationSource::from_config(&config).unwrap();
        assert_eq!(source.remote.endpoint(), "http://localhost:9/api/translations-json");
        assert_eq!(source.bundle.path_for(Language::ARABIC), PathBuf::from("i18n/ar.json"));
    }
}
