//! Cached record for one resolved hostname

use std::net::IpAddr;
use std::time::{Duration, Instant};

/// One hostname's resolved addresses plus the bookkeeping the cache and the
/// background refresher need.
///
/// An entry never lives in the store with an empty `ips` list; a lookup that
/// yields no addresses is an error, not an empty entry.
#[derive(Debug, Clone)]
pub struct DnsEntry {
    /// The hostname this entry was resolved from, kept here for refresh use.
    pub host: String,
    /// Resolved addresses, in resolver order.
    pub ips: Vec<IpAddr>,
    /// Round-robin cursor. Incremented on every read and used modulo
    /// `ips.len()`; wraps rather than resets, the raw value carries no
    /// meaning beyond the modulus.
    pub next_idx: u64,
    /// When this entry was last read.
    pub last_used: Instant,
    /// When this entry was last successfully resolved.
    pub updated: Instant,
}

impl DnsEntry {
    pub fn new(host: &str, ips: Vec<IpAddr>, now: Instant) -> Self {
        debug_assert!(!ips.is_empty(), "entry created without addresses");
        Self {
            host: host.to_string(),
            ips,
            next_idx: 0,
            last_used: now,
            updated: now,
        }
    }

    /// Return the address at the current cursor and advance the cursor for
    /// the next reader.
    pub fn select_ip(&mut self) -> IpAddr {
        let idx = (self.next_idx % self.ips.len() as u64) as usize;
        self.next_idx = self.next_idx.wrapping_add(1);
        self.ips[idx]
    }

    /// Whether the freshness TTL has passed since the last resolution.
    pub fn is_stale(&self, now: Instant, dns_ttl: Duration) -> bool {
        now.duration_since(self.updated) >= dns_ttl
    }

    /// Whether the idle window has passed since the last read.
    pub fn is_idle(&self, now: Instant, idle_ttl: Duration) -> bool {
        now.duration_since(self.last_used) >= idle_ttl
    }
}
