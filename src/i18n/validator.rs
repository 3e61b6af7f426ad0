//! Catalog quality validation.
//!
//! Compares a language's catalog against the reference (default language)
//! catalog so gaps show up in the logs instead of as raw keys on the page.

use crate::i18n::{Catalog, I18nError, I18nResult};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Keys that can never be looked up
    pub errors: Vec<String>,

    /// Coverage gaps and suspicious values
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for catalog coverage and key syntax.
pub struct CatalogValidator;

static KEY_REGEX: OnceLock<Regex> = OnceLock::new();

fn key_regex() -> &'static Regex {
    KEY_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*$").expect("key pattern is valid")
    })
}

/// Check that `key` is a well-formed dotted key (`nav.services`, `form.name_label`).
pub fn validate_key(key: &str) -> I18nResult<()> {
    if key_regex().is_match(key) {
        Ok(())
    } else {
        Err(I18nError::MalformedKey(key.to_string()))
    }
}

impl CatalogValidator {
    /// Validate `candidate` against `reference`.
    ///
    /// Errors:
    /// - keys in the candidate that are not well-formed
    ///
    /// Warnings:
    /// - keys in the reference missing from the candidate
    /// - keys only the candidate has
    /// - empty values (they always resolve to the fallback)
    pub fn validate(reference: &Catalog, candidate: &Catalog) -> ValidationReport {
        let mut report = ValidationReport::new();

        let reference_keys: BTreeSet<String> =
            reference.flatten().into_iter().map(|(key, _)| key).collect();
        let candidate_entries = candidate.flatten();
        let candidate_keys: BTreeSet<String> =
            candidate_entries.iter().map(|(key, _)| key.clone()).collect();

        for (key, value) in &candidate_entries {
            if validate_key(key).is_err() {
                report.errors.push(format!("Malformed key: '{}'", key));
            }
            if value.trim().is_empty() {
                report.warnings.push(format!("Empty value for '{}'", key));
            }
        }

        let missing: Vec<_> = reference_keys.difference(&candidate_keys).collect();
        if !missing.is_empty() {
            report.warnings.push(format!(
                "Missing {} key(s): {:?}",
                missing.len(),
                missing
            ));
        }

        let extra: Vec<_> = candidate_keys.difference(&reference_keys).collect();
        if !extra.is_empty() {
            report
                .warnings
                .push(format!("Unknown {} key(s): {:?}", extra.len(), extra));
        }

        report
    }
}
