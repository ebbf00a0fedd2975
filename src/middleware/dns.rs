//! The interception point: rewrite an outgoing request's host to a cached IP
//!
//! The original hostname is preserved in the `Host` header so the remote
//! side still sees the intended virtual host. A failure anywhere in the
//! sequence is recorded and the request goes out untouched; the caching
//! layer never costs a request.

use futures::future::BoxFuture;
use http::HeaderValue;
use http::header;
use url::Host;

use super::Middleware;
use crate::error::{Error, Result};
use crate::http::HttpRequest;
use crate::service::DnsCache;

/// Middleware that substitutes cached IPs into outgoing request URLs.
pub struct DnsInterceptor {
    cache: DnsCache,
}

impl DnsInterceptor {
    #[must_use]
    pub fn new(cache: DnsCache) -> Self {
        Self { cache }
    }

    async fn intercept(&self, mut request: HttpRequest) -> HttpRequest {
        let host = match request.effective_url().host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            // literal addresses gain nothing from resolution
            _ => return request,
        };

        if let Err(err) = self.rewrite(&mut request, &host).await {
            let message = format!("request for {host} forwarded unrewritten");
            self.cache.record_error(&err, &message);
        }
        request
    }

    /// All fallible steps happen before the first mutation, so an error
    /// leaves the request exactly as it arrived.
    async fn rewrite(&self, request: &mut HttpRequest, host: &str) -> Result<()> {
        let ip = self.cache.get_address(host).await?;
        let host_header = HeaderValue::from_str(host)
            .map_err(|e| Error::Rewrite(format!("host {host} is not a valid header value: {e}")))?;
        request
            .effective_url_mut()
            .set_ip_host(ip)
            .map_err(|()| Error::Rewrite(format!("url for {host} cannot carry an ip host")))?;
        request.headers_mut().insert(header::HOST, host_header);
        Ok(())
    }
}

impl Middleware for DnsInterceptor {
    fn process_request<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpRequest>> {
        Box::pin(async move { Ok(self.intercept(request).await) })
    }
}
