//! Configuration for the DNS cache
//!
//! All options carry defaults; `from_env` overrides them from `DNS_CACHE_*`
//! environment variables, falling back to the default on absent or
//! unparseable values.

use std::time::Duration;

/// Runtime configuration for [`DnsCache`](crate::DnsCache).
#[derive(Debug, Clone)]
pub struct DnsCacheConfig {
    /// Turns the interceptor into a pass-through; the cache itself stays usable.
    pub disabled: bool,
    /// Freshness window before an entry is considered stale.
    pub dns_ttl: Duration,
    /// Multiplies `dns_ttl` to compute the store's own soft-expiry window.
    pub grace_expire_multiplier: u32,
    /// Inactivity window after which an unused entry is evicted.
    pub idle_ttl: Duration,
    /// Interval between background refresh sweeps.
    pub background_scan_interval: Duration,
    /// Entry-count capacity before least-recently-touched eviction.
    pub max_entries: usize,
}

impl Default for DnsCacheConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            dns_ttl: Duration::from_millis(5000),
            grace_expire_multiplier: 2,
            idle_ttl: Duration::from_millis(1000 * 60 * 60),
            background_scan_interval: Duration::from_millis(2400),
            max_entries: 100,
        }
    }
}

impl DnsCacheConfig {
    /// Build a configuration from `DNS_CACHE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            disabled: env_flag("DNS_CACHE_DISABLE"),
            dns_ttl: env_ms("DNS_CACHE_TTL_MS", defaults.dns_ttl),
            grace_expire_multiplier: env_parse(
                "DNS_CACHE_EXPIRE_MULTIPLIER",
                defaults.grace_expire_multiplier,
            ),
            idle_ttl: env_ms("DNS_CACHE_IDLE_TTL_MS", defaults.idle_ttl),
            background_scan_interval: env_ms(
                "DNS_CACHE_BACKGROUND_SCAN_MS",
                defaults.background_scan_interval,
            ),
            max_entries: env_parse("DNS_CACHE_SIZE", defaults.max_entries),
        }
    }

    /// Soft-expiry window of the underlying store.
    ///
    /// Entries not touched within this window are treated as gone even
    /// before the idle pruner removes them.
    #[must_use]
    pub fn store_expiry(&self) -> Duration {
        self.dns_ttl
            .saturating_mul(self.grace_expire_multiplier.max(1))
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "true" || v == "1")
}

fn env_ms(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
