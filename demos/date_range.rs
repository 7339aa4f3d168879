//! # Date range coordination
//!
//! A chart cannot fetch before it knows the date range of its group. It asks for
//! it over the event bus; the selector of group `"A"` answers in that context
//! only. A page-wide listener subscribed globally sees `dispatch_to_all` but not
//! the contextual answer.
//!
//! ## Run
//! ```bash
//! RUST_LOG=widgetvisor=debug cargo run --example date_range
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;
use widgetvisor::{
    signals, Attributes, Config, Ctx, Event, FetchError, Plan, Prerequisite, Request, Runtime,
    Scope, Transport, Widget,
};

struct Backend;

#[async_trait]
impl Transport for Backend {
    async fn fetch(&self, request: Request) -> Result<Value, FetchError> {
        Ok(json!({"Value": format!("{} bars", request.url.len() % 7 + 3)}))
    }
}

/// Publishes the range of its group when asked.
struct RangeSelector {
    range: String,
}

impl Widget for RangeSelector {
    fn name(&self) -> &str {
        "range-selector"
    }

    fn initialize(&mut self, ctx: &mut Ctx<'_>) {
        ctx.listen_global(signals::ASK_FOR_DATE_TIME_RANGE);
    }

    fn on_signal(&mut self, ctx: &mut Ctx<'_>, event: &Event) {
        if event.is(signals::ASK_FOR_DATE_TIME_RANGE) {
            let group = ctx.attribute("group").unwrap_or("default").to_string();
            ctx.bus().dispatch_to_context(
                signals::DATE_TIME_RANGE_CHANGE,
                &group,
                json!({"daterange": self.range}),
            );
        }
    }
}

/// Bar chart over the range of its group.
#[derive(Default)]
struct Chart {
    range: Option<String>,
}

impl Widget for Chart {
    fn name(&self) -> &str {
        "chart"
    }

    fn observed_attributes(&self) -> &[&str] {
        &["group"]
    }

    fn initialize(&mut self, ctx: &mut Ctx<'_>) {
        let group = ctx.attribute("group").unwrap_or("default").to_string();
        ctx.listen(signals::DATE_TIME_RANGE_CHANGE, &group);
    }

    fn clear_initialization(&mut self) {
        self.range = None;
    }

    fn plan(&mut self, _ctx: &mut Ctx<'_>) -> Plan {
        match &self.range {
            Some(range) => Plan::Fetch(Request::get(format!(
                "http://pulse/Bars?Range={range}"
            ))),
            None => Plan::Await(Prerequisite::ask(signals::ASK_FOR_DATE_TIME_RANGE)),
        }
    }

    fn refresh(&mut self, _ctx: &mut Ctx<'_>, data: &Value) {
        println!("[chart] {:?}: {}", self.range, data["Value"]);
    }

    fn attribute_changed(
        &mut self,
        ctx: &mut Ctx<'_>,
        name: &str,
        _old: Option<&str>,
        new: Option<&str>,
    ) {
        if name == "group" {
            ctx.resubscribe(signals::DATE_TIME_RANGE_CHANGE, Some(new.unwrap_or("default")));
            self.range = None;
            ctx.start();
        }
    }

    fn on_signal(&mut self, ctx: &mut Ctx<'_>, event: &Event) {
        if let Some(range) = event.target["daterange"].as_str() {
            self.range = Some(range.to_string());
            ctx.start();
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let rt = Runtime::builder(Config::default())
        .with_transport(Arc::new(Backend))
        .build();

    rt.bus().add_global_event_listener(
        Scope::next(),
        signals::DATE_TIME_RANGE_CHANGE,
        |ev: &Event| println!("[page] range is now {}", ev.target),
    );

    let _selector = rt.mount_with(
        RangeSelector {
            range: "[2024-05-01,2024-05-02)".into(),
        },
        Attributes::new().with("group", "A"),
    );
    let chart = rt.mount_with(Chart::default(), Attributes::new().with("group", "A"));

    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("chart: {}", chart.snapshot().await?.state);

    rt.bus().dispatch_to_all(
        signals::DATE_TIME_RANGE_CHANGE,
        json!({"daterange": "[2024-06-01,2024-06-08)"}),
    );
    tokio::time::sleep(Duration::from_millis(200)).await;

    println!("-- moving the chart to group B (nobody answers there)");
    chart.set_attribute("group", Some("B"))?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("chart: {}", chart.snapshot().await?.state);

    rt.shutdown();
    chart.join().await?;
    Ok(())
}
