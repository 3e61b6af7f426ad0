//! Locale metrics: lookup hit rates, catalog load outcomes, subscriber failures.
//!
//! One instance is owned by each [`LocaleState`](crate::i18n::LocaleState);
//! counters are lock-free so recording never contends with lookups.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct LocaleMetrics {
    /// Lookups that resolved to a translated string
    lookup_hits: AtomicUsize,

    /// Lookups that fell back to the caller's fallback value
    lookup_misses: AtomicUsize,

    /// Catalogs installed from the remote translation API
    remote_loads: AtomicUsize,

    /// Catalogs installed from the bundled files after the remote failed
    bundle_fallbacks: AtomicUsize,

    /// Languages for which both sources failed
    load_failures: AtomicUsize,

    /// Subscriber invocations that returned an error or panicked
    subscriber_failures: AtomicUsize,
}

impl LocaleMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_lookup_hit(&self) {
        self.lookup_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup_miss(&self) {
        self.lookup_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_load(&self) {
        self.remote_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bundle_fallback(&self) {
        self.bundle_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_subscriber_failure(&self) {
        self.subscriber_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn lookup_hits(&self) -> usize {
        self.lookup_hits.load(Ordering::Relaxed)
    }

    pub fn lookup_misses(&self) -> usize {
        self.lookup_misses.load(Ordering::Relaxed)
    }

    pub fn remote_loads(&self) -> usize {
        self.remote_loads.load(Ordering::Relaxed)
    }

    pub fn bundle_fallbacks(&self) -> usize {
        self.bundle_fallbacks.load(Ordering::Relaxed)
    }

    pub fn load_failures(&self) -> usize {
        self.load_failures.load(Ordering::Relaxed)
    }

    pub fn subscriber_failures(&self) -> usize {
        self.subscriber_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.lookup_hits();
        let misses = self.lookup_misses();
        let total_lookups = hits + misses;
        let lookup_hit_rate = if total_lookups > 0 {
            (hits as f64 / total_lookups as f64) * 100.0
        } else {
            0.0
        };

        let remote = self.remote_loads();
        let bundle = self.bundle_fallbacks();
        let failures = self.load_failures();
        let attempts = remote + bundle + failures;
        let remote_success_rate = if attempts > 0 {
            (remote as f64 / attempts as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            lookup_hits: hits,
            lookup_misses: misses,
            lookup_hit_rate,
            remote_loads: remote,
            bundle_fallbacks: bundle,
            load_failures: failures,
            remote_success_rate,
            subscriber_failures: self.subscriber_failures(),
        }
    }
}

/// Snapshot of the counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub lookup_hits: usize,
    pub lookup_misses: usize,

    /// Lookup hit rate as a percentage (0-100)
    pub lookup_hit_rate: f64,

    pub remote_loads: usize,
    pub bundle_fallbacks: usize,
    pub load_failures: usize,

    /// Share of catalog loads served by the remote API, as a percentage (0-100)
    pub remote_success_rate: f64,

    pub subscriber_failures: usize,
}
