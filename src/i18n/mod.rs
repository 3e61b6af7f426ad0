//! Internationalization (i18n) module: catalogs, sources and the locale state.
//!
//! # Architecture
//!
//! - `registry`: the closed set of supported languages and their metadata
//! - `language`: validated `Language` handle built only from registry codes
//! - `catalog`: per-language tree of translations with dotted-key lookup
//! - `source`: remote-first, bundle-fallback catalog resolution and the
//!   all-settle load of every language
//! - `state`: `LocaleState`, the one writable holder of the active language,
//!   the installed catalogs and the change subscribers
//! - `validator`: catalog coverage and key syntax checks
//! - `metrics`: lookup and load counters
//!
//! # Example
//!
//! ```rust,ignore
//! use site_locale::i18n::{LocaleState, TranslationSource};
//!
//! let state = Arc::new(LocaleState::new(store));
//! let report = source.load_all(&state).await;
//! state.set_active_language("en")?;
//! let label = state.translate("nav.services");
//! ```

mod catalog;
mod error;
mod language;
mod metrics;
mod registry;
mod source;
mod state;
mod validator;

pub use catalog::{Catalog, CatalogNode, CatalogShapeError, KEY_SEPARATOR};
pub use error::{I18nError, I18nResult, SourceError};
pub use language::Language;
pub use metrics::{LocaleMetrics, MetricsReport};
pub use registry::{LanguageConfig, LanguageRegistry, TextDirection};
pub use source::{
    BundledCatalogs, CatalogOrigin, LoadReport, RemoteCatalogs, ResolvedCatalog,
    TranslationSource,
};
pub use state::{LocalePhase, LocaleState, Subscriber};
pub use validator::{validate_key, CatalogValidator, ValidationReport};
