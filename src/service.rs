//! The cache-or-resolve service and its background tasks
//!
//! [`DnsCache`] is a cheaply cloneable handle over shared state: the entry
//! store, the stats, the resolver, and the two periodic tasks (refresh
//! sweep, idle prune) managed by `initialize`/`shutdown`.

use std::fmt;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::cache::{DnsEntry, EntryStore};
use crate::config::DnsCacheConfig;
use crate::dns::{HickoryResolver, Resolve, resolve_all};
use crate::error::Result;
use crate::middleware::{DnsInterceptor, MiddlewareChain};
use crate::stats::{CacheStats, StatsSnapshot};

/// Upper bound on refreshes in flight within one sweep.
const MAX_CONCURRENT_REFRESHES: usize = 8;

/// Transparent DNS-resolution cache for outbound HTTP requests.
///
/// Clones share the same cache. Dropping every clone stops the background
/// tasks on their next tick; calling [`DnsCache::shutdown`] stops them
/// immediately.
#[derive(Clone)]
pub struct DnsCache {
    shared: Arc<Shared>,
}

struct Shared {
    config: DnsCacheConfig,
    store: EntryStore,
    stats: CacheStats,
    resolver: Arc<dyn Resolve>,
    sweep_running: AtomicBool,
    tasks: Mutex<Option<TaskHandles>>,
}

struct TaskHandles {
    refresher: JoinHandle<()>,
    pruner: JoinHandle<()>,
}

impl DnsCache {
    /// Build a cache backed by the system resolver.
    #[must_use]
    pub fn new(config: DnsCacheConfig) -> Self {
        Self::with_resolver(config, Arc::new(HickoryResolver::new()))
    }

    /// Build a cache with an injected resolver.
    #[must_use]
    pub fn with_resolver(config: DnsCacheConfig, resolver: Arc<dyn Resolve>) -> Self {
        let store = EntryStore::new(config.max_entries, config.store_expiry());
        Self {
            shared: Arc::new(Shared {
                store,
                stats: CacheStats::new(),
                resolver,
                sweep_running: AtomicBool::new(false),
                tasks: Mutex::new(None),
                config,
            }),
        }
    }

    pub fn config(&self) -> &DnsCacheConfig {
        &self.shared.config
    }

    /// Resolve `host` through the cache.
    ///
    /// Hits rotate round-robin through the cached addresses. A miss suspends
    /// on the resolver, stores the fresh entry, and returns its first
    /// address. Resolution failures propagate to the caller.
    pub async fn get_address(&self, host: &str) -> Result<IpAddr> {
        if let Some(ip) = self.shared.store.hit(host, Instant::now()) {
            self.shared.stats.record_hit();
            return Ok(ip);
        }

        self.shared.stats.record_miss();
        tracing::debug!(host, "dns cache miss");

        let ips = resolve_all(self.shared.resolver.as_ref(), host).await?;
        let mut entry = DnsEntry::new(host, ips, Instant::now());
        let ip = entry.select_ip();
        self.shared.store.set(host, entry);
        Ok(ip)
    }

    /// One pass of the background refresher over every current entry.
    ///
    /// Fresh entries are skipped; stale-and-idle entries are evicted; stale
    /// but active entries are re-resolved, with at most
    /// [`MAX_CONCURRENT_REFRESHES`] lookups in flight. A failure on one
    /// entry leaves its stale addresses serving and never aborts the rest.
    /// Only one sweep runs at a time; overlapping calls are no-ops.
    pub async fn run_sweep(&self) {
        if self
            .shared
            .sweep_running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        // released on drop, so a sweep canceled mid-await cannot wedge the guard
        let _guard = SweepGuard(&self.shared.sweep_running);

        let entries = self.shared.store.entries();
        futures::stream::iter(entries)
            .for_each_concurrent(MAX_CONCURRENT_REFRESHES, |entry| self.sweep_entry(entry))
            .await;
    }

    async fn sweep_entry(&self, entry: DnsEntry) {
        let config = &self.shared.config;
        let now = Instant::now();

        if !entry.is_stale(now, config.dns_ttl) {
            return;
        }

        // Idle wins over refresh: no point re-resolving a host nobody asks for.
        if entry.is_idle(now, config.idle_ttl) {
            if self
                .shared
                .store
                .remove_if_idle(&entry.host, now, config.idle_ttl)
            {
                self.shared.stats.record_idle_expired();
                tracing::debug!(host = %entry.host, "idle dns entry expired");
            }
            return;
        }

        match resolve_all(self.shared.resolver.as_ref(), &entry.host).await {
            Ok(ips) => {
                if self.shared.store.refresh(&entry.host, ips, Instant::now()) {
                    self.shared.stats.record_refreshed();
                }
            }
            Err(err) => {
                let message = format!("background refresh failed for {}", entry.host);
                self.shared.stats.record_error(&err, &message);
            }
        }
    }

    /// Start the background refresher and the idle pruner.
    ///
    /// Idempotent; a second call while running is a no-op, and the tasks can
    /// be restarted after [`DnsCache::shutdown`]. Must be called within a
    /// Tokio runtime.
    pub fn initialize(&self) {
        let mut tasks = self.lock_tasks();
        if tasks.is_some() {
            return;
        }

        let scan = self.shared.config.background_scan_interval;
        let weak = Arc::downgrade(&self.shared);
        let refresher = tokio::spawn(async move {
            let mut ticks = interval_after(scan);
            loop {
                ticks.tick().await;
                let Some(shared) = weak.upgrade() else { break };
                DnsCache { shared }.run_sweep().await;
            }
        });

        let idle = self.shared.config.idle_ttl;
        let weak = Arc::downgrade(&self.shared);
        let pruner = tokio::spawn(async move {
            let mut ticks = interval_after(idle);
            loop {
                ticks.tick().await;
                let Some(shared) = weak.upgrade() else { break };
                let purged = shared.store.purge_stale();
                if purged > 0 {
                    tracing::debug!(purged, "pruned stale dns entries");
                }
            }
        });

        *tasks = Some(TaskHandles { refresher, pruner });
        tracing::debug!("dns cache background tasks started");
    }

    /// Stop both periodic tasks. In-flight resolutions are left to finish
    /// on their own. Idempotent.
    pub fn shutdown(&self) {
        if let Some(tasks) = self.lock_tasks().take() {
            tasks.refresher.abort();
            tasks.pruner.abort();
            tracing::debug!("dns cache background tasks stopped");
        }
    }

    /// Attach the DNS interceptor to a client's middleware chain.
    ///
    /// Respects the `disabled` config flag by registering nothing.
    pub fn register_interceptor(&self, chain: &mut MiddlewareChain) {
        if self.shared.config.disabled {
            tracing::debug!("dns cache disabled, interceptor not registered");
            return;
        }
        chain.push(Arc::new(DnsInterceptor::new(self.clone())));
    }

    /// Current counters plus the live entry count.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot(self.shared.store.len())
    }

    /// Snapshot of all cached entries.
    #[must_use]
    pub fn entries(&self) -> Vec<DnsEntry> {
        self.shared.store.entries()
    }

    /// Drop entries past the store's soft-expiry window; returns how many
    /// were removed. The idle pruner task calls this on its own period.
    pub fn purge_stale(&self) -> usize {
        self.shared.store.purge_stale()
    }

    pub(crate) fn record_error(&self, error: &dyn fmt::Display, message: &str) {
        self.shared.stats.record_error(error, message);
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Option<TaskHandles>> {
        self.shared
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for DnsCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsCache")
            .field("entries", &self.shared.store.len())
            .field("config", &self.shared.config)
            .finish()
    }
}

struct SweepGuard<'a>(&'a AtomicBool);

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn interval_after(period: Duration) -> tokio::time::Interval {
    let period = period.max(Duration::from_millis(1));
    let mut ticks = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticks
}
