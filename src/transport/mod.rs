//! Network seam of the lifecycle engine.
//!
//! ## Contents
//! - [`Request`], [`Method`] one request of a fetch cycle
//! - [`Transport`] async backend contract (success payload | transport failure)
//! - [`Offline`] backend used when none is configured
//! - `HttpTransport` (`http` feature) `reqwest` backend with bearer token

mod backend;
#[cfg(feature = "http")]
mod http;
mod request;

pub use backend::{Offline, Transport};
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use request::{Method, Request};
