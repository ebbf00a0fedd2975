use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;

use cached_dns_resolve::{BoxError, DnsCache, DnsCacheConfig, Error, Resolve};

/// Resolver that replays queued answers and counts calls.
#[derive(Default)]
struct ScriptedResolver {
    answers: Mutex<VecDeque<Result<Vec<IpAddr>, String>>>,
    calls: AtomicUsize,
}

impl ScriptedResolver {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push_ips(&self, ips: &[&str]) {
        let ips = ips.iter().map(|s| s.parse().expect("test ip")).collect();
        self.answers.lock().unwrap().push_back(Ok(ips));
    }

    fn push_failure(&self, message: &str) {
        self.answers.lock().unwrap().push_back(Err(message.to_string()));
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Resolve for ScriptedResolver {
    fn resolve(&self, _host: &str) -> BoxFuture<'static, Result<Vec<IpAddr>, BoxError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.answers.lock().unwrap().pop_front();
        Box::pin(async move {
            match next {
                Some(Ok(ips)) => Ok(ips),
                Some(Err(message)) => Err(message.into()),
                None => Err("no scripted answer".into()),
            }
        })
    }
}

fn test_config() -> DnsCacheConfig {
    DnsCacheConfig {
        dns_ttl: Duration::from_millis(40),
        idle_ttl: Duration::from_secs(60),
        // keep the store's own expiry out of the way
        grace_expire_multiplier: 10_000,
        ..DnsCacheConfig::default()
    }
}

fn ip(s: &str) -> IpAddr {
    s.parse().expect("test ip")
}

#[tokio::test]
async fn first_call_resolves_once_and_returns_first_address() {
    let resolver = ScriptedResolver::new();
    resolver.push_ips(&["10.0.0.1", "10.0.0.2"]);
    let cache = DnsCache::with_resolver(test_config(), resolver.clone());

    let got = cache.get_address("api.example.com").await.unwrap();

    assert_eq!(got, ip("10.0.0.1"));
    assert_eq!(resolver.calls(), 1);
    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.entries, 1);
}

#[tokio::test]
async fn round_robin_returns_each_address_once_then_wraps() {
    let resolver = ScriptedResolver::new();
    resolver.push_ips(&["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    let cache = DnsCache::with_resolver(test_config(), resolver.clone());

    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(cache.get_address("api.example.com").await.unwrap());
    }

    assert_eq!(
        seen,
        vec![ip("10.0.0.1"), ip("10.0.0.2"), ip("10.0.0.3"), ip("10.0.0.1")]
    );
    assert_eq!(resolver.calls(), 1, "cached hits must not re-resolve");
    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 3);
}

#[tokio::test]
async fn resolution_failure_propagates_and_caches_nothing() {
    let resolver = ScriptedResolver::new();
    resolver.push_failure("NXDOMAIN");
    let cache = DnsCache::with_resolver(test_config(), resolver.clone());

    let err = cache.get_address("gone.example.com").await.unwrap_err();

    assert!(matches!(err, Error::Resolution { .. }));
    assert!(cache.entries().is_empty());
    assert_eq!(cache.stats().misses, 1);
}

#[tokio::test]
async fn empty_lookup_is_a_resolution_error() {
    let resolver = ScriptedResolver::new();
    resolver.push_ips(&[]);
    let cache = DnsCache::with_resolver(test_config(), resolver.clone());

    let err = cache.get_address("empty.example.com").await.unwrap_err();

    assert!(matches!(err, Error::Resolution { .. }));
    assert!(cache.entries().is_empty(), "no entry may exist without addresses");
}

#[tokio::test]
async fn stale_entry_serves_refreshed_addresses_after_sweep() {
    // the documented scenario, scaled down: rotate across two addresses,
    // go stale, refresh to a single new address, next read returns it
    let resolver = ScriptedResolver::new();
    resolver.push_ips(&["10.0.0.1", "10.0.0.2"]);
    let cache = DnsCache::with_resolver(test_config(), resolver.clone());

    assert_eq!(cache.get_address("api.example.com").await.unwrap(), ip("10.0.0.1"));
    assert_eq!(cache.get_address("api.example.com").await.unwrap(), ip("10.0.0.2"));
    assert_eq!(cache.get_address("api.example.com").await.unwrap(), ip("10.0.0.1"));

    tokio::time::sleep(Duration::from_millis(80)).await;
    resolver.push_ips(&["10.0.0.3"]);
    cache.run_sweep().await;

    assert_eq!(cache.stats().refreshed, 1);
    assert_eq!(cache.get_address("api.example.com").await.unwrap(), ip("10.0.0.3"));
    assert_eq!(resolver.calls(), 2);
}

#[tokio::test]
async fn distinct_hosts_get_distinct_entries() {
    let resolver = ScriptedResolver::new();
    resolver.push_ips(&["10.0.0.1"]);
    resolver.push_ips(&["10.0.0.2"]);
    let cache = DnsCache::with_resolver(test_config(), resolver.clone());

    let a = cache.get_address("a.example.com").await.unwrap();
    let b = cache.get_address("b.example.com").await.unwrap();

    assert_eq!((a, b), (ip("10.0.0.1"), ip("10.0.0.2")));
    assert_eq!(cache.stats().entries, 2);
    assert_eq!(resolver.calls(), 2);
}

#[tokio::test]
async fn lifecycle_is_idempotent_and_restartable() {
    let resolver = ScriptedResolver::new();
    let cache = DnsCache::with_resolver(test_config(), resolver);

    cache.initialize();
    cache.initialize();
    cache.shutdown();
    cache.shutdown();
    cache.initialize();
    cache.shutdown();
}

#[test]
fn stats_snapshot_serializes() {
    tokio_test::block_on(async {
        let resolver = ScriptedResolver::new();
        resolver.push_ips(&["10.0.0.1"]);
        let cache = DnsCache::with_resolver(test_config(), resolver);
        cache.get_address("api.example.com").await.unwrap();

        let value = serde_json::to_value(cache.stats()).unwrap();
        assert_eq!(value["misses"], 1);
        assert_eq!(value["entries"], 1);
        assert_eq!(value["last_error"], serde_json::Value::Null);
    });
}
