//! # Dashboard
//!
//! Mounts three machine-status widgets on a simulated backend:
//! - machine 1 answers normally,
//! - machine 2 has no recent data (`NotAvailable`),
//! - machine 3 is unreachable (grace window, then `Error`).
//!
//! Machine 1 is hidden for a while to show visibility-gated polling.
//!
//! ## Run
//! ```bash
//! RUST_LOG=widgetvisor=debug cargo run --example dashboard
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;
use widgetvisor::{
    Attributes, Config, Ctx, FetchError, Plan, Request, Runtime, Success, Transport,
    ValidationError, Widget,
};

/// Backend answering `/Machine/Status?MachineId=N`.
#[derive(Default)]
struct FakePulse {
    hits: AtomicU64,
}

#[async_trait]
impl Transport for FakePulse {
    async fn fetch(&self, request: Request) -> Result<Value, FetchError> {
        let n = self.hits.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(50)).await;
        if request.url.contains("MachineId=3") {
            return Err(FetchError::Connect {
                message: "connection refused".into(),
            });
        }
        if request.url.contains("MachineId=2") {
            return Ok(json!({"Value": "Idle", "AgeSeconds": 7200}));
        }
        Ok(json!({"Value": if n % 2 == 0 { "Running" } else { "Setup" }, "AgeSeconds": 1}))
    }
}

struct MachineStatus {
    label: String,
}

impl Widget for MachineStatus {
    fn name(&self) -> &str {
        &self.label
    }

    fn observed_attributes(&self) -> &[&str] {
        &["machine-id"]
    }

    fn refresh_rate(&self) -> Option<Duration> {
        Some(Duration::from_secs(1))
    }

    fn validate_parameters(&mut self, ctx: &mut Ctx<'_>) -> Result<(), ValidationError> {
        match ctx.attributes().parse::<u32>("machine-id") {
            Some(Ok(_)) => Ok(()),
            Some(Err(_)) => Err(ValidationError::immediate("machine-id is not a number")),
            None => Err(ValidationError::delayed("missing machine-id")),
        }
    }

    fn plan(&mut self, ctx: &mut Ctx<'_>) -> Plan {
        let id = ctx.attribute("machine-id").unwrap_or_default();
        let request = Request::get(format!("http://pulse/Machine/Status?MachineId={id}"));
        Plan::Fetch(if ctx.is_reload() {
            ctx.bust_cache(request)
        } else {
            request
        })
    }

    fn manage_success(&mut self, _ctx: &mut Ctx<'_>, data: &Value) -> Success {
        if data["AgeSeconds"].as_u64().unwrap_or_default() > 3600 {
            Success::NotAvailable("no recent data".into())
        } else {
            Success::Display
        }
    }

    fn refresh(&mut self, _ctx: &mut Ctx<'_>, data: &Value) {
        println!("[{}] {}", self.label, data["Value"].as_str().unwrap_or("?"));
    }

    fn display_error(&mut self, message: &str) {
        println!("[{}] !! {message}", self.label);
    }

    fn remove_error(&mut self) {
        println!("[{}] (error cleared)", self.label);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = Config {
        delay_rate: Duration::from_millis(500),
        transient_error_delay: Duration::from_secs(3),
        ..Config::default()
    };
    let rt = Runtime::builder(cfg)
        .with_transport(Arc::new(FakePulse::default()))
        .build();

    let mut handles = Vec::new();
    for id in 1..=3 {
        let widget = MachineStatus {
            label: format!("machine-{id}"),
        };
        let attrs = Attributes::new().with("machine-id", id.to_string());
        handles.push(rt.mount_with(widget, attrs));
    }

    tokio::time::sleep(Duration::from_secs(2)).await;
    println!("-- hiding machine-1");
    handles[0].set_visible(false)?;

    tokio::time::sleep(Duration::from_secs(3)).await;
    println!("-- showing machine-1");
    handles[0].set_visible(true)?;

    tokio::time::sleep(Duration::from_secs(2)).await;
    for h in &handles {
        let snap = h.snapshot().await?;
        println!("{:<10} {:<24} error={:?}", h.name(), snap.state, snap.shown_error);
    }

    rt.shutdown();
    for h in handles {
        h.join().await?;
    }
    Ok(())
}
