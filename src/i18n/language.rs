//! Language type: validated, copyable handle to a registry entry.

use crate::i18n::{I18nError, I18nResult, LanguageConfig, LanguageRegistry, TextDirection};
use serde::{Serialize, Serializer};
use std::fmt;

/// A supported language.
///
/// Only codes present in the [`LanguageRegistry`] can become a `Language`, so
/// holding one proves membership in the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Language {
    code: &'static str,
}

impl Language {
    pub const TURKISH: Language = Language { code: "tr" };
    pub const ENGLISH: Language = Language { code: "en" };
    pub const ARABIC: Language = Language { code: "ar" };
    pub const RUSSIAN: Language = Language { code: "ru" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is supported
    /// * `Err(I18nError::UnsupportedLanguage)` otherwise
    pub fn from_code(code: &str) -> I18nResult<Language> {
        LanguageRegistry::get()
            .get_by_code(code)
            .map(|config| Language { code: config.code })
            .ok_or_else(|| I18nError::UnsupportedLanguage(code.to_string()))
    }

    /// The language used when no preference has been persisted.
    pub fn default_language() -> Language {
        Language {
            code: LanguageRegistry::get().default_language().code,
        }
    }

    /// Every supported language, in registry order.
    pub fn all() -> Vec<Language> {
        LanguageRegistry::get()
            .list()
            .iter()
            .map(|config| Language { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Never in practice: a `Language` can only be built from a registry code.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Presentation direction. Total over the supported set: only Arabic is RTL.
    pub fn direction(&self) -> TextDirection {
        self.config().direction
    }

    pub fn is_rtl(&self) -> bool {
        self.direction() == TextDirection::Rtl
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

/// Serialized as the bare language code.
impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}
