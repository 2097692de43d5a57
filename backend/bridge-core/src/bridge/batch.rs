//! Concurrent fan-out of independent requests.
//!
//! Batch members bypass the priority queue. All of them are dispatched before
//! any response is awaited; results come back in input order.

use crate::bridge::Bridge;
use crate::error::bridge::BridgeError;

use models::{BatchItem, RequestOptions};

use futures_util::future::{join_all, try_join_all};
use log::debug;
use serde_json::Value;

impl Bridge {
    /// All-or-nothing batch.
    ///
    /// Resolves with every result in input order, or fails as soon as one member
    /// has failed for good (after its own retries). The other members are still
    /// completed by the bridge, but their outcomes are not reported.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Batch`] naming the failing member's method and index.
    pub async fn batch(&self, items: Vec<BatchItem>) -> Result<Vec<Value>, BridgeError> {
        debug!("Dispatching batch of {} requests", items.len());

        let calls = items.into_iter().enumerate().map(|(index, item)| {
            let BatchItem { method, params } = item;
            async move {
                self.request(method.clone(), params, RequestOptions::default())
                    .await
                    .map_err(|source| BridgeError::batch(method, index, source))
            }
        });

        try_join_all(calls).await
    }

    /// Partial-results batch: one outcome per member, in input order.
    pub async fn batch_settled(&self, items: Vec<BatchItem>) -> Vec<Result<Value, BridgeError>> {
        debug!("Dispatching settled batch of {} requests", items.len());

        let calls = items.into_iter().map(|item| {
            self.request(item.method, item.params, RequestOptions::default())
        });

        join_all(calls).await
    }
}
