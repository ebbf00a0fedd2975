//! Bounded, time-aware store for resolved hostnames
//!
//! One mutex guards the whole map. Every operation is a short, in-memory
//! critical section; resolution is never awaited while the lock is held.
//! Entry mutation always happens inside the store, under the lock, so a
//! torn entry (for instance one with an empty address list) can never be
//! observed, and concurrent round-robin reads never lose an increment.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::entry::DnsEntry;

struct Slot {
    entry: DnsEntry,
    /// Recency stamp, bumped on read and write alike. Drives both
    /// least-recently-touched eviction and the soft-expiry window.
    touched: Instant,
}

/// Keyed store of [`DnsEntry`] values with capacity eviction and a
/// soft-expiry window independent of capacity pressure.
pub struct EntryStore {
    capacity: usize,
    expiry: Duration,
    slots: Mutex<HashMap<String, Slot>>,
}

impl EntryStore {
    /// `capacity` is the entry-count bound; `expiry` the soft-expiry window
    /// measured from an entry's last touch.
    #[must_use]
    pub fn new(capacity: usize, expiry: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            expiry,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expired(&self, slot: &Slot, now: Instant) -> bool {
        now.duration_since(slot.touched) >= self.expiry
    }

    /// Copy out the entry for `host`, bumping its recency.
    ///
    /// A soft-expired entry is removed and reported as absent.
    pub fn get(&self, host: &str) -> Option<DnsEntry> {
        let now = Instant::now();
        let mut slots = self.lock();
        if self.expired(slots.get(host)?, now) {
            slots.remove(host);
            return None;
        }
        let slot = slots.get_mut(host)?;
        slot.touched = now;
        Some(slot.entry.clone())
    }

    /// Insert or replace the entry for `host`, evicting the
    /// least-recently-touched entry first when a new key would exceed
    /// capacity.
    pub fn set(&self, host: &str, entry: DnsEntry) {
        let now = Instant::now();
        let mut slots = self.lock();
        if !slots.contains_key(host) && slots.len() >= self.capacity {
            evict_lru(&mut slots);
        }
        slots.insert(host.to_string(), Slot { entry, touched: now });
    }

    /// The read-path transaction: select the address at the current cursor,
    /// advance the cursor, and stamp the entry as used, all in one critical
    /// section.
    pub fn hit(&self, host: &str, now: Instant) -> Option<IpAddr> {
        let mut slots = self.lock();
        if self.expired(slots.get(host)?, now) {
            slots.remove(host);
            return None;
        }
        let slot = slots.get_mut(host)?;
        slot.touched = now;
        slot.entry.last_used = now;
        Some(slot.entry.select_ip())
    }

    /// Replace `ips` and bump `updated` for a still-present entry, leaving
    /// the cursor and `last_used` untouched. Returns false if the entry is
    /// gone.
    pub fn refresh(&self, host: &str, ips: Vec<IpAddr>, now: Instant) -> bool {
        debug_assert!(!ips.is_empty(), "refresh with no addresses");
        let mut slots = self.lock();
        match slots.get_mut(host) {
            Some(slot) => {
                slot.entry.ips = ips;
                slot.entry.updated = now;
                slot.touched = now;
                true
            }
            None => false,
        }
    }

    /// Delete `host` only if it is still idle at the time the lock is held.
    /// Returns whether an entry was removed.
    pub fn remove_if_idle(&self, host: &str, now: Instant, idle_ttl: Duration) -> bool {
        let mut slots = self.lock();
        let idle = match slots.get(host) {
            Some(slot) => slot.entry.is_idle(now, idle_ttl),
            None => false,
        };
        if idle {
            slots.remove(host);
        }
        idle
    }

    /// Remove `host` unconditionally. Returns whether an entry was present.
    pub fn delete(&self, host: &str) -> bool {
        self.lock().remove(host).is_some()
    }

    /// Snapshot of all live entries, dropping soft-expired ones on the way.
    #[must_use]
    pub fn entries(&self) -> Vec<DnsEntry> {
        let now = Instant::now();
        let mut slots = self.lock();
        slots.retain(|_, slot| now.duration_since(slot.touched) < self.expiry);
        slots.values().map(|slot| slot.entry.clone()).collect()
    }

    /// Drop every entry past the soft-expiry window; returns how many went.
    pub fn purge_stale(&self) -> usize {
        let now = Instant::now();
        let mut slots = self.lock();
        let before = slots.len();
        slots.retain(|_, slot| now.duration_since(slot.touched) < self.expiry);
        before - slots.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

fn evict_lru(slots: &mut HashMap<String, Slot>) {
    let victim = slots
        .iter()
        .min_by_key(|(_, slot)| slot.touched)
        .map(|(host, _)| host.clone());
    if let Some(host) = victim {
        slots.remove(&host);
        tracing::debug!(host = %host, "evicted least recently touched dns entry");
    }
}
