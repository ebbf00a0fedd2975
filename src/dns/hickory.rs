//! DNS resolution via the [hickory-resolver](https://github.com/hickory-dns/hickory-dns) crate

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use futures::future::BoxFuture;
use hickory_resolver::TokioResolver;
use hickory_resolver::config::{LookupIpStrategy, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use once_cell::sync::OnceCell;

use super::Resolve;
use crate::error::BoxError;

/// Production [`Resolve`] implementation backed by a shared
/// [`TokioResolver`].
///
/// Construction of the underlying resolver is delayed until the first
/// lookup, so building the cache itself can never fail.
#[derive(Default, Clone)]
pub struct HickoryResolver {
    state: Arc<OnceCell<TokioResolver>>,
}

impl fmt::Debug for HickoryResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HickoryResolver").finish_non_exhaustive()
    }
}

impl HickoryResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Resolve for HickoryResolver {
    fn resolve(&self, host: &str) -> BoxFuture<'static, Result<Vec<IpAddr>, BoxError>> {
        let state = self.state.clone();
        let host = host.to_string();
        Box::pin(async move {
            let resolver = state.get_or_init(new_resolver);
            let lookup = resolver
                .lookup_ip(host.as_str())
                .await
                .map_err(|e| Box::new(e) as BoxError)?;
            Ok(lookup.into_iter().collect())
        })
    }
}

/// Create a resolver from the system configuration (`/etc/resolv.conf`),
/// falling back to the library defaults when no system configuration can be
/// read. The options are overridden to look up both IPv4 and IPv6 addresses.
fn new_resolver() -> TokioResolver {
    let mut builder = match TokioResolver::builder_tokio() {
        Ok(builder) => builder,
        Err(e) => {
            tracing::debug!(error = %e, "no usable system dns config, using defaults");
            TokioResolver::builder_with_config(
                ResolverConfig::default(),
                TokioConnectionProvider::default(),
            )
        }
    };
    builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
    builder.build()
}
