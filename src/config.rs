use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Remote translation API (prefix for `translations-json?lang=<code>`)
    pub api_base: String,

    // Bundled fallback catalogs (`<dir>/<code>.json`)
    pub bundle_dir: PathBuf,

    // Durable client storage
    pub state_file: PathBuf,

    // Page manifest painted by the binary (optional)
    pub page_manifest: Option<PathBuf>,

    // No timeout unless configured; a hung remote only stalls its own language
    pub remote_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_base = std::env::var("SITE_API_BASE")
            .unwrap_or_else(|_| "http://localhost:8080/api/".to_string());
        reqwest::Url::parse(&api_base)
            .with_context(|| format!("SITE_API_BASE is not a valid URL: {}", api_base))?;

        Ok(Self {
            api_base,
            bundle_dir: std::env::var("SITE_I18N_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("i18n")),
            state_file: std::env::var("SITE_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".site-locale.json")),
            page_manifest: std::env::var("SITE_PAGE_MANIFEST").ok().map(PathBuf::from),
            remote_timeout: std::env::var("SITE_REMOTE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        })
    }
}
