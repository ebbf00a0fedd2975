//! Cache statistics and error bookkeeping
//!
//! Counters live for the lifetime of the process and reset only on restart.
//! `record_error` is the single chokepoint every caught failure funnels
//! through, from the background refresher and the request interceptor alike.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for the DNS cache.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Reads served from the cache.
    pub hits: AtomicU64,
    /// Reads that required a fresh resolution.
    pub misses: AtomicU64,
    /// Entries re-resolved by the background sweep.
    pub refreshed: AtomicU64,
    /// Entries evicted for going idle.
    pub idle_expired: AtomicU64,
    /// Failures recorded through [`CacheStats::record_error`].
    pub errors: AtomicU64,
    last_error: Mutex<Option<String>>,
    last_error_ts: Mutex<Option<String>>,
}

/// Point-in-time view of [`CacheStats`] plus the live entry count.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub refreshed: u64,
    pub idle_expired: u64,
    pub errors: u64,
    pub last_error: Option<String>,
    pub last_error_ts: Option<String>,
}

impl CacheStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refreshed(&self) {
        self.refreshed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_idle_expired(&self) {
        self.idle_expired.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a caught failure: bump the counter, remember the error and
    /// when it happened, and log it.
    pub fn record_error(&self, error: &dyn std::fmt::Display, message: &str) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        let rendered = error.to_string();
        tracing::error!(error = %rendered, "{message}");
        if let Ok(mut last) = self.last_error.lock() {
            *last = Some(rendered);
        }
        if let Ok(mut ts) = self.last_error_ts.lock() {
            *ts = Some(chrono::Utc::now().to_rfc3339());
        }
    }

    /// Snapshot the counters together with the current entry count.
    #[must_use]
    pub fn snapshot(&self, entries: usize) -> StatsSnapshot {
        StatsSnapshot {
            entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            refreshed: self.refreshed.load(Ordering::Relaxed),
            idle_expired: self.idle_expired.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            last_error: self.last_error.lock().ok().and_then(|g| g.clone()),
            last_error_ts: self.last_error_ts.lock().ok().and_then(|g| g.clone()),
        }
    }
}
