//! Outgoing HTTP request carrier

use http::{HeaderMap, Method};
use url::Url;

/// The mutable surface of an outgoing request as seen by middleware.
///
/// When `base_url` is set it overrides `url` as the effective target, the
/// way a client-level base URL does; the interceptor rewrites whichever of
/// the two is in effect.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    url: Url,
    base_url: Option<Url>,
    headers: HeaderMap,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            base_url: None,
            headers: HeaderMap::new(),
        }
    }

    /// Convenience constructor for a GET request.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The URL this request will actually be sent to.
    pub fn effective_url(&self) -> &Url {
        self.base_url.as_ref().unwrap_or(&self.url)
    }

    pub fn effective_url_mut(&mut self) -> &mut Url {
        self.base_url.as_mut().unwrap_or(&mut self.url)
    }
}
