//! # Cached DNS resolution for outbound HTTP requests
//!
//! A transparent caching layer between an HTTP client and the system
//! resolver. Each outgoing request has its hostname resolved through the
//! cache, the IP substituted into the URL, and the original hostname
//! preserved in the `Host` header for virtual hosting.
//!
//! ## Features
//!
//! - **Round-robin rotation** across every address a host resolves to
//! - **Background refresh** of stale-but-active entries, so the resolver is
//!   never hit on the request path after first contact
//! - **Idle eviction** and least-recently-touched capacity eviction
//! - **Graceful degradation**: any failure forwards the request untouched
//! - **Hit/miss/refresh/error counters** with a serializable snapshot
//!
//! ## Usage
//!
//! ```no_run
//! use cached_dns_resolve::{DnsCache, DnsCacheConfig, MiddlewareChain};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), cached_dns_resolve::Error> {
//! let cache = DnsCache::new(DnsCacheConfig::default());
//! cache.initialize();
//!
//! // attach to a client's outgoing-request hook
//! let mut chain = MiddlewareChain::new();
//! cache.register_interceptor(&mut chain);
//!
//! // or resolve directly
//! let ip = cache.get_address("api.example.com").await?;
//! println!("resolved to {ip}, stats: {:?}", cache.stats());
//!
//! cache.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod dns;
pub mod error;
pub mod http;
pub mod middleware;
pub mod service;
pub mod stats;

pub use cache::{DnsEntry, EntryStore};
pub use config::DnsCacheConfig;
pub use dns::{HickoryResolver, Resolve};
pub use error::{BoxError, Error, Result};
pub use http::HttpRequest;
pub use middleware::{DnsInterceptor, Middleware, MiddlewareChain};
pub use service::DnsCache;
pub use stats::{CacheStats, StatsSnapshot};
