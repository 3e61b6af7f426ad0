//! Page model: the rendered nodes a language switch has to rewrite.
//!
//! Mirrors the markup contract of the site: every localizable element carries a
//! `data-key`, and every language button carries a `data-lang`.

use crate::i18n::{Language, TextDirection};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which content slot of an element holds its localized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Plain container; the translation replaces its text
    #[serde(rename = "text")]
    Text,

    /// `<input>`/`<textarea>`; the translation replaces its placeholder
    #[serde(rename = "input")]
    Placeholder,

    /// `<option>` inside a select; the translation replaces its label
    #[serde(rename = "option")]
    OptionLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewNode {
    #[serde(rename = "data-key")]
    pub key: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub placeholder: String,
}

impl ViewNode {
    fn new(key: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            key: key.into(),
            kind,
            text: String::new(),
            placeholder: String::new(),
        }
    }

    pub fn text(key: impl Into<String>) -> Self {
        Self::new(key, NodeKind::Text)
    }

    pub fn input(key: impl Into<String>) -> Self {
        Self::new(key, NodeKind::Placeholder)
    }

    pub fn option(key: impl Into<String>) -> Self {
        Self::new(key, NodeKind::OptionLabel)
    }

    /// The slot this node's kind writes to. Exactly one per kind.
    pub fn content(&self) -> &str {
        match self.kind {
            NodeKind::Text | NodeKind::OptionLabel => &self.text,
            NodeKind::Placeholder => &self.placeholder,
        }
    }

    pub(crate) fn content_mut(&mut self) -> &mut String {
        match self.kind {
            NodeKind::Text | NodeKind::OptionLabel => &mut self.text,
            NodeKind::Placeholder => &mut self.placeholder,
        }
    }
}

/// A language switch button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageControl {
    #[serde(rename = "data-lang")]
    pub lang: String,
    #[serde(default)]
    pub active: bool,
}

impl LanguageControl {
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            active: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub nodes: Vec<ViewNode>,
    #[serde(default)]
    pub controls: Vec<LanguageControl>,
    #[serde(default)]
    pub direction: TextDirection,
}

impl Page {
    pub fn new(nodes: Vec<ViewNode>) -> Self {
        Self {
            nodes,
            controls: Self::standard_controls(),
            direction: TextDirection::Ltr,
        }
    }

    /// One control per supported language, in registry order.
    pub fn standard_controls() -> Vec<LanguageControl> {
        Language::all()
            .into_iter()
            .map(|language| LanguageControl::new(language.code()))
            .collect()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid page manifest")
    }

    /// Load a page manifest. Pages without controls get the standard set.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page manifest {}", path.display()))?;
        let mut page = Self::from_json_str(&content)?;
        if page.controls.is_empty() {
            page.controls = Self::standard_controls();
        }
        Ok(page)
    }

    /// The control currently marked active, if any.
    pub fn active_control(&self) -> Option<&LanguageControl> {
        self.controls.iter().find(|control| control.active)
    }
}
