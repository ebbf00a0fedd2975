//! DNS resolution seam
//!
//! The platform resolver is opaque behind the [`Resolve`] trait so the cache
//! can be driven by [`HickoryResolver`] in production and by scripted
//! resolvers in tests. [`resolve_all`] wraps the trait call with the
//! validation the cache relies on: a successful lookup with zero addresses
//! is an error, never an empty entry.

pub mod hickory;

use std::net::IpAddr;

use futures::future::BoxFuture;

use crate::error::{BoxError, Error, Result};

pub use hickory::HickoryResolver;

/// Asynchronous hostname resolution.
///
/// Implementations return every address the platform knows for the host,
/// not just the first. Retry policy lives in the callers.
pub trait Resolve: Send + Sync {
    fn resolve(&self, host: &str) -> BoxFuture<'static, std::result::Result<Vec<IpAddr>, BoxError>>;
}

/// Resolve `host` to a non-empty address list.
///
/// Platform failures and empty lookups both surface as
/// [`Error::Resolution`] after being logged.
pub async fn resolve_all(resolver: &dyn Resolve, host: &str) -> Result<Vec<IpAddr>> {
    match resolver.resolve(host).await {
        Ok(ips) if ips.is_empty() => {
            tracing::error!(host, "lookup returned no usable addresses");
            Err(Error::resolution(host, "no usable addresses"))
        }
        Ok(ips) => Ok(ips),
        Err(e) => {
            tracing::error!(host, error = %e, "dns lookup failed");
            Err(Error::resolution(host, e.to_string()))
        }
    }
}
