//! # Transport contract
//!
//! `Transport` is the seam between the lifecycle engine and the network. One
//! call is one fetch cycle; the engine applies the timeout and tags the result
//! with the request token, so implementations only perform the request.
//!
//! ## Contract
//! - Return the decoded JSON body on success, even when it carries an
//!   application-level error field; classification is the engine's job.
//! - Map non-success HTTP statuses to [`FetchError::Status`].
//! - No cancellation signal is sent: a superseded request simply completes and
//!   its result is discarded.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;
use crate::transport::Request;

/// Contract for network backends.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Performs one request.
    async fn fetch(&self, request: Request) -> Result<Value, FetchError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Transport used when none is configured: every request fails to connect.
#[derive(Debug, Default, Clone, Copy)]
pub struct Offline;

#[async_trait]
impl Transport for Offline {
    async fn fetch(&self, request: Request) -> Result<Value, FetchError> {
        Err(FetchError::Connect {
            message: format!("no transport configured for {}", request.url),
        })
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
