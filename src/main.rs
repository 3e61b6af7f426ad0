//! Bootstraps the site locale and prints what the page would show.
//!
//! Usage:
//!   site-locale                  # Active (persisted) language, painted page manifest
//!   site-locale en               # Switch to English first
//!   site-locale ar nav.services  # Switch to Arabic, print the given keys
//!
//! Optional environment variables:
//! - SITE_API_BASE (defaults to http://localhost:8080/api/)
//! - SITE_I18N_DIR (defaults to i18n)
//! - SITE_STATE_FILE (defaults to .site-locale.json)
//! - SITE_PAGE_MANIFEST (no page painted when unset)
//! - SITE_REMOTE_TIMEOUT_SECS (no timeout when unset)

use anyhow::Result;
use site_locale::app::App;
use site_locale::config::Config;
use site_locale::i18n::LanguageRegistry;
use site_locale::storage::FileStore;
use site_locale::view::Page;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_locale=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let requested = requested_language(args.first().map(String::as_str))?;

    let config = Config::from_env()?;
    let store = Arc::new(FileStore::open(&config.state_file)?);
    info!("Preferences stored at {}", store.path().display());
    let page = match &config.page_manifest {
        Some(path) => Page::load(path)?,
        None => Page::new(Vec::new()),
    };

    let mut app = App::from_config(&config, store, page)?;
    let report = app.bootstrap().await;
    for (language, error) in &report.failed {
        warn!("{} will show raw keys: {}", language, error);
    }

    if let Some(code) = requested {
        app.switch_language(code)?;
    }

    let state = app.state();
    let keys = args.get(1..).unwrap_or_default();
    if keys.is_empty() {
        let page = app.page();
        info!(
            "Page in {} ({}):",
            state.active_language(),
            page.direction.as_str()
        );
        for node in &page.nodes {
            println!("{} = {}", node.key, node.content());
        }
    } else {
        for key in keys {
            println!("{} = {}", key, state.translate(key));
        }
    }

    info!("Load report: {}", serde_json::to_string(&report)?);
    info!("Metrics: {}", serde_json::to_string(&state.metrics().report())?);
    Ok(())
}

/// Check the optional language argument before any network work.
fn requested_language(code: Option<&str>) -> Result<Option<&str>> {
    let Some(code) = code else {
        return Ok(None);
    };

    let registry = LanguageRegistry::get();
    if !registry.is_supported(code) {
        let supported: Vec<&str> = registry.list().iter().map(|config| config.code).collect();
        anyhow::bail!(
            "Unsupported language '{}'. Usage: site-locale [{}] [KEY...]",
            code,
            supported.join("|")
        );
    }
    Ok(Some(code))
}
