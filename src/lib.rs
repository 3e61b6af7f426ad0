//! Language resolution and view synchronization for a multilingual marketing site.
//!
//! Catalogs are loaded from the site's translation API with a per-language
//! fallback to bundled JSON files, held in a single [`i18n::LocaleState`], and
//! pushed onto the rendered page by a [`view::ViewSynchronizer`] on every
//! language switch.

pub mod app;
pub mod config;
pub mod i18n;
pub mod storage;
pub mod view;
