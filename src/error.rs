//! Error types for the DNS caching layer

use thiserror::Error;

/// A `Result` alias where the `Err` case is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error type used at the resolver trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced by the caching layer.
///
/// None of these are ever fatal to the request path: the interceptor catches
/// both kinds and forwards the original request, so the worst case is a
/// request that sees no caching benefit.
#[derive(Debug, Error)]
pub enum Error {
    /// The platform lookup failed or returned no usable address.
    #[error("dns resolution failed for {host}: {message}")]
    Resolution { host: String, message: String },

    /// A malformed URL or host was encountered while rewriting a request.
    #[error("request rewrite failed: {0}")]
    Rewrite(String),
}

impl Error {
    pub(crate) fn resolution(host: &str, message: impl Into<String>) -> Self {
        Self::Resolution {
            host: host.to_string(),
            message: message.into(),
        }
    }
}
