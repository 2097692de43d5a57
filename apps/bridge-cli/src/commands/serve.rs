use crate::error::CliError;

use bridge_core::host::{MethodRouter, start_host_server};

use std::future::Future;
use std::time::{Duration, SystemTime};

use humantime::format_rfc3339;
use log::{debug, info};
use serde_json::{Value, json};
use tokio::select;
use tokio::time::{Instant, interval_at};

pub const HEARTBEAT_EVENT: &str = "heartbeat";

/// Fields the demo `validate` method treats as mandatory.
const REQUIRED_FIELDS: [&str; 2] = ["title", "assignee"];

/// Host methods served by `editor-bridge serve`.
pub fn demo_router() -> MethodRouter {
    MethodRouter::new()
        .route("getFields", |_params| async {
            Ok(json!([
                { "name": "title", "type": "text", "required": true },
                { "name": "assignee", "type": "user", "required": true },
                { "name": "priority", "type": "select", "options": ["low", "normal", "high"] },
                { "name": "dueDate", "type": "date", "required": false }
            ]))
        })
        .route("getBehaviors", |_params| async {
            Ok(json!([
                {
                    "field": "dueDate",
                    "behavior": "requiredWhen",
                    "condition": { "field": "priority", "equals": "high" }
                }
            ]))
        })
        .route("validate", |params| async move { validate_form(&params) })
        .route("echo", |params| async move { Ok(params) })
}

fn validate_form(params: &Value) -> Result<Value, String> {
    let Some(values) = params.as_object() else {
        return Err("validate expects an object of field values".to_string());
    };

    let errors: Vec<Value> = REQUIRED_FIELDS
        .iter()
        .filter(|field| {
            values
                .get(**field)
                .and_then(Value::as_str)
                .is_none_or(|value| value.trim().is_empty())
        })
        .map(|field| json!({ "field": field, "message": "Field is required" }))
        .collect();

    Ok(json!({ "valid": errors.is_empty(), "errors": errors }))
}

/// Run the demo host on `127.0.0.1:<port>` until `shutdown` resolves.
///
/// With a `heartbeat` period a `heartbeat` event carrying a sequence number and
/// timestamp is pushed to every connected client each period.
pub async fn serve(
    port: u16,
    heartbeat: Option<Duration>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), CliError> {
    let router = demo_router();
    let methods = router.methods().join(", ");
    let handle = start_host_server(port, router).await?;

    info!("Serving {} (methods: {methods})", handle.url());

    tokio::pin!(shutdown);

    match heartbeat {
        Some(period) => {
            let mut ticker = interval_at(Instant::now() + period, period);
            let mut sequence: u64 = 0;
            loop {
                select! {
                    _ = ticker.tick() => {
                        sequence += 1;
                        let delivered = handle.emit(
                            HEARTBEAT_EVENT,
                            json!({
                                "sequence": sequence,
                                "timestamp": format_rfc3339(SystemTime::now()).to_string(),
                            }),
                        );
                        debug!("Heartbeat {sequence} delivered to {delivered} client(s)");
                    }
                    _ = &mut shutdown => break,
                }
            }
        }
        None => shutdown.await,
    }

    info!("Shutting down host endpoint");
    handle.shutdown().await;
    Ok(())
}
