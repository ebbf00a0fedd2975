//! Minimal outgoing-request model
//!
//! Only the interception seam of the HTTP pipeline is represented here: the
//! pieces of an outgoing request the DNS interceptor reads and rewrites.

pub mod request;

pub use request::HttpRequest;
