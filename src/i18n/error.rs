//! Error types for catalog loading and language switching.
//!
//! Lookup misses are not errors and never appear here; they resolve to a
//! fallback string at the [`LocaleState`](crate::i18n::LocaleState) boundary.

use crate::i18n::CatalogShapeError;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single catalog source could not produce a catalog.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("translation API returned {status}")]
    Status { status: StatusCode },

    #[error("translation API reported failure: {message}")]
    Rejected { message: String },

    #[error("translation API response carried no catalog")]
    EmptyPayload,

    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Shape(#[from] CatalogShapeError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("Unsupported language code: '{0}'")]
    UnsupportedLanguage(String),

    #[error("Malformed translation key: '{0}'")]
    MalformedKey(String),

    /// Both the remote API and the bundled file failed for one language.
    #[error("No catalog available for '{language}' (remote: {remote}; bundle: {bundle})")]
    Unavailable {
        language: &'static str,
        remote: SourceError,
        bundle: SourceError,
    },
}

pub type I18nResult<T> = Result<T, I18nError>;
