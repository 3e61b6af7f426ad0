//! Locale state: the single writable source of language truth.
//!
//! One `LocaleState` is built at startup and shared by `Arc` with everything
//! that needs to translate or react to a language switch. It owns the active
//! language, the installed catalogs and the ordered subscriber list.

use crate::i18n::{Catalog, I18nResult, Language, LocaleMetrics};
use crate::storage::{PreferenceStore, LANG_KEY};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, error, info, warn};

/// Callback invoked with the new language after every switch.
///
/// Identity is the `Arc` allocation: keep the handle to unsubscribe later.
pub type Subscriber = Arc<dyn Fn(Language) -> anyhow::Result<()> + Send + Sync>;

/// Where the page is in its load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalePhase {
    Uninitialized,
    Loading,
    Ready(Language),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Loading,
    Ready,
}

pub struct LocaleState {
    active: RwLock<Language>,
    catalogs: RwLock<HashMap<Language, Arc<Catalog>>>,
    subscribers: Mutex<Vec<Subscriber>>,
    lifecycle: RwLock<Lifecycle>,
    store: Arc<dyn PreferenceStore>,
    metrics: LocaleMetrics,
    // Held across persist, write and notify of one switch.
    switch: Mutex<()>,
}

impl LocaleState {
    /// Create the state, restoring the persisted language when it is supported.
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        let active = match store.get(LANG_KEY) {
            Some(code) => Language::from_code(&code).unwrap_or_else(|_| {
                warn!("Ignoring persisted language '{}': not supported", code);
                Language::default_language()
            }),
            None => Language::default_language(),
        };
        debug!("Locale state created with active language {}", active);

        Self {
            active: RwLock::new(active),
            catalogs: RwLock::new(HashMap::new()),
            subscribers: Mutex::new(Vec::new()),
            lifecycle: RwLock::new(Lifecycle::Uninitialized),
            store,
            metrics: LocaleMetrics::new(),
            switch: Mutex::new(()),
        }
    }

    pub fn active_language(&self) -> Language {
        *self.active.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch the active language.
    ///
    /// Unsupported codes are rejected with a warning and leave the state
    /// untouched. On success the code is persisted, the active language is
    /// updated and every subscriber is notified in registration order, even when
    /// the language did not change.
    ///
    /// Concurrent switches are serialized: each one persists, updates and
    /// notifies before the next begins, so storage always ends up holding the
    /// in-memory language and every switch delivers its own notification.
    /// Subscribers must not switch the language themselves; that deadlocks.
    pub fn set_active_language(&self, code: &str) -> I18nResult<Language> {
        let language = match Language::from_code(code) {
            Ok(language) => language,
            Err(e) => {
                warn!("Rejected language switch: {}", e);
                return Err(e);
            }
        };

        let _switch = self.switch.lock().unwrap_or_else(PoisonError::into_inner);

        if let Err(e) = self.store.set(LANG_KEY, language.code()) {
            warn!("Failed to persist language '{}': {:#}", language, e);
        }

        *self.active.write().unwrap_or_else(PoisonError::into_inner) = language;
        info!("Active language set to {}", language);

        self.notify_subscribers(language);
        Ok(language)
    }

    /// Install or replace the catalog for `language`.
    ///
    /// Readers either see the previous catalog or the new one, never a mix.
    pub fn install_catalog(&self, language: Language, catalog: Catalog) {
        let entries = catalog.len();
        self.catalogs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(language, Arc::new(catalog));
        debug!("Installed {} catalog ({} entries)", language, entries);
    }

    pub fn catalog(&self, language: Language) -> Option<Arc<Catalog>> {
        self.catalogs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&language)
            .cloned()
    }

    /// Languages with an installed catalog, in registry order.
    pub fn loaded_languages(&self) -> Vec<Language> {
        let catalogs = self.catalogs.read().unwrap_or_else(PoisonError::into_inner);
        Language::all()
            .into_iter()
            .filter(|language| catalogs.contains_key(language))
            .collect()
    }

    /// Translate `key` in the active language, falling back to the key itself so
    /// missing translations stay visible.
    pub fn translate(&self, key: &str) -> String {
        self.translate_or(key, key)
    }

    /// Translate `key` in the active language, or return `fallback` on a miss.
    ///
    /// Never fails: a catalog that is not loaded yet is just another miss.
    pub fn translate_or(&self, key: &str, fallback: &str) -> String {
        let language = self.active_language();
        let resolved = self
            .catalog(language)
            .and_then(|catalog| catalog.lookup(key).map(str::to_string));

        match resolved {
            Some(text) => {
                self.metrics.record_lookup_hit();
                text
            }
            None => {
                self.metrics.record_lookup_miss();
                debug!("Missing translation for '{}' in {}", key, language);
                fallback.to_string()
            }
        }
    }

    pub fn subscribe(&self, subscriber: Subscriber) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(subscriber);
    }

    /// Remove `subscriber` by identity. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, subscriber: &Subscriber) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|existing| !Arc::ptr_eq(existing, subscriber));
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Notify every subscriber of the active language again, without a switch.
    pub(crate) fn renotify(&self) {
        let _switch = self.switch.lock().unwrap_or_else(PoisonError::into_inner);
        self.notify_subscribers(self.active_language());
    }

    /// Invoke every subscriber with `language`, in registration order.
    ///
    /// The list is snapshotted first so a callback may subscribe or unsubscribe
    /// without deadlocking. A failing or panicking callback is logged and does
    /// not stop the ones after it.
    fn notify_subscribers(&self, language: Language) {
        let snapshot: Vec<Subscriber> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for (index, subscriber) in snapshot.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| subscriber(language))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.metrics.record_subscriber_failure();
                    error!("Language subscriber #{} failed for {}: {:#}", index, language, e);
                }
                Err(payload) => {
                    self.metrics.record_subscriber_failure();
                    error!(
                        "Language subscriber #{} panicked for {}: {}",
                        index,
                        language,
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
    }

    pub fn phase(&self) -> LocalePhase {
        match *self.lifecycle.read().unwrap_or_else(PoisonError::into_inner) {
            Lifecycle::Uninitialized => LocalePhase::Uninitialized,
            Lifecycle::Loading => LocalePhase::Loading,
            Lifecycle::Ready => LocalePhase::Ready(self.active_language()),
        }
    }

    pub(crate) fn begin_loading(&self) {
        *self.lifecycle.write().unwrap_or_else(PoisonError::into_inner) = Lifecycle::Loading;
    }

    pub(crate) fn mark_ready(&self) {
        *self.lifecycle.write().unwrap_or_else(PoisonError::into_inner) = Lifecycle::Ready;
    }

    pub fn metrics(&self) -> &LocaleMetrics {
        &self.metrics
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}
