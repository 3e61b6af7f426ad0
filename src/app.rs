//! Page-load lifecycle: wires the locale state, the catalog sources and the
//! page synchronizer, then drives the bootstrap.

use crate::config::Config;
use crate::i18n::{
    CatalogOrigin, CatalogValidator, I18nResult, Language, LoadReport, LocaleState,
    Subscriber, TranslationSource,
};
use crate::storage::PreferenceStore;
use crate::view::{Page, SyncOutcome, ViewSynchronizer};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

pub struct App {
    state: Arc<LocaleState>,
    source: TranslationSource,
    synchronizer: Arc<ViewSynchronizer>,
    subscription: Option<Subscriber>,
}

impl App {
    pub fn new(source: TranslationSource, store: Arc<dyn PreferenceStore>, page: Page) -> Self {
        let state = Arc::new(LocaleState::new(store));
        let synchronizer = Arc::new(ViewSynchronizer::new(Arc::clone(&state), page));
        Self {
            state,
            source,
            synchronizer,
            subscription: None,
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn PreferenceStore>, page: Page) -> Result<Self> {
        Ok(Self::new(TranslationSource::from_config(config)?, store, page))
    }

    /// Load every catalog, then paint the page in the active language.
    ///
    /// Per-language failures end up in the returned report; the page still
    /// reaches the ready phase and shows raw keys where nothing loaded.
    pub async fn bootstrap(&mut self) -> LoadReport {
        self.state.begin_loading();
        let report = self.source.load_all(&self.state).await;
        self.validate_catalogs();
        self.state.mark_ready();

        if self.subscription.is_none() {
            self.subscription = Some(self.synchronizer.attach());
        }
        let outcome = self.synchronizer.sync(self.state.active_language());
        info!(
            "✅ Bootstrap complete in {} ({} nodes painted)",
            self.state.active_language(),
            outcome.repaint.updated
        );
        report
    }

    /// Warn about gaps in every loaded catalog compared to the default language.
    fn validate_catalogs(&self) {
        let default = Language::default_language();
        let Some(reference) = self.state.catalog(default) else {
            warn!("Default language {} has no catalog; skipping validation", default);
            return;
        };

        for language in self.state.loaded_languages() {
            if language == default {
                continue;
            }
            let Some(catalog) = self.state.catalog(language) else {
                continue;
            };
            let report = CatalogValidator::validate(&reference, &catalog);
            if report.has_warnings() {
                warn!("Catalog warnings for {}: {:?}", language, report.warnings);
            }
            if report.has_errors() {
                warn!("Catalog errors for {}: {:?}", language, report.errors);
            }
        }
    }

    /// User-initiated language switch.
    pub fn switch_language(&self, code: &str) -> I18nResult<Language> {
        self.state.set_active_language(code)
    }

    /// Reload one language. When it is the active one, subscribers are notified
    /// so the page picks up the new catalog.
    pub async fn reload(&self, language: Language) -> I18nResult<CatalogOrigin> {
        let origin = self.source.reload(&self.state, language).await?;
        if language == self.state.active_language() {
            self.state.renotify();
        }
        Ok(origin)
    }

    /// Repaint the page without a language change.
    pub fn repaint(&self) -> SyncOutcome {
        self.synchronizer.sync(self.state.active_language())
    }

    pub fn state(&self) -> &Arc<LocaleState> {
        &self.state
    }

    pub fn page(&self) -> Page {
        self.synchronizer.page()
    }
}
