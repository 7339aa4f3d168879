//! # HTTP transport over `reqwest`.
//!
//! Requires the `http` feature. Attaches `Authorization: Bearer <token>` when a
//! login token is known; the token can be set directly or follow
//! `TokenHasChangedEvent` on an [`EventBus`].

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;
use crate::events::{signals, EventBus, Scope};
use crate::transport::{Method, Request, Transport};

/// JSON-over-HTTP transport.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
    token: Arc<RwLock<Option<String>>>,
}

impl HttpTransport {
    /// Creates a transport with a default `reqwest` client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport over a preconfigured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            token: Arc::default(),
        }
    }

    /// Replaces the login token (`None` after logout).
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    /// Current login token.
    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Keeps the token in sync with `TokenHasChangedEvent` (global listener).
    ///
    /// The event target is the new token string, or `null` after logout.
    /// Returns the scope owning the subscription.
    pub fn follow_token(&self, bus: &EventBus) -> Scope {
        let scope = Scope::next();
        let token = Arc::clone(&self.token);
        bus.add_global_event_listener(scope, signals::TOKEN_HAS_CHANGED, move |ev| {
            let next = ev.target.as_str().map(str::to_string);
            debug!(logged_in = next.is_some(), "login token changed");
            *token.write() = next;
        });
        scope
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: Request) -> Result<Value, FetchError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = self.token() {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| FetchError::Connect {
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<Value>().await.map_err(|e| FetchError::Decode {
            message: e.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
