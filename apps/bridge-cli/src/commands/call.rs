use crate::error::CliError;

use bridge_core::Bridge;
use models::{HealthStatus, MethodMetrics, RequestOptions};

use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

/// Arguments of `editor-bridge call`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArgs {
    pub method: String,
    pub params: Option<String>,
    pub priority: Option<i32>,
    pub timeout_ms: Option<u64>,
}

impl CallArgs {
    pub fn params(&self) -> Result<Value, CliError> {
        match &self.params {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(Value::Null),
        }
    }

    pub fn options(&self) -> Result<RequestOptions, CliError> {
        let mut builder = RequestOptions::builder();
        if let Some(priority) = self.priority {
            builder = builder.with_priority(priority);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            builder = builder.with_timeout_ms(timeout_ms);
        }
        Ok(builder.build()?)
    }
}

/// What `call` prints: the result plus the bridge's view of the exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallReport {
    pub result: Value,
    pub metrics: MethodMetrics,
    pub health: HealthStatus,
}

/// Initialize `bridge`, send one request, collect metrics and health, then disconnect.
///
/// The bridge is disconnected whether or not the request succeeded.
pub async fn call(bridge: &Bridge, args: &CallArgs) -> Result<CallReport, CliError> {
    let params = args.params()?;
    let options = args.options()?;

    if let Err(e) = bridge.initialize().await {
        bridge.disconnect().await;
        return Err(e.into());
    }

    let outcome = bridge.request(args.method.as_str(), params, options).await;
    let metrics = bridge.metrics(Some(args.method.as_str())).await;
    let health = bridge.health_status().await;
    bridge.disconnect().await;

    match outcome {
        Ok(result) => {
            info!(
                "{} succeeded ({:.1}ms average over {} request(s))",
                args.method, metrics.average_latency, metrics.total_requests
            );
            Ok(CallReport {
                result,
                metrics,
                health,
            })
        }
        Err(e) => {
            match e.attempts() {
                Some(attempts) => warn!("{} failed after {attempts} attempt(s)", args.method),
                None => warn!("{} failed [{}]", args.method, e.code()),
            }
            Err(e.into())
        }
    }
}
