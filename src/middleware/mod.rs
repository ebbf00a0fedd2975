//! Request middleware seam
//!
//! The caching layer plugs into an HTTP client as one middleware in a chain.
//! Processing is async because the DNS interceptor may suspend on a fresh
//! resolution.

pub mod dns;

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::Result;
use crate::http::HttpRequest;

pub use dns::DnsInterceptor;

/// Hook invoked on every outgoing request before it is sent.
pub trait Middleware: Send + Sync {
    fn process_request<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpRequest>>;
}

/// Middleware applied in registration order.
#[derive(Default, Clone)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Run the request through every middleware in order.
    pub async fn process_request(&self, mut request: HttpRequest) -> Result<HttpRequest> {
        for middleware in &self.middlewares {
            request = middleware.process_request(request).await?;
        }
        Ok(request)
    }
}
