use crate::error::CliError;

use bridge_core::Bridge;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::info;

/// Initialize `bridge`, log every push for `events` until `shutdown` resolves.
///
/// Returns how many pushes were received.
pub async fn watch(
    bridge: &Bridge,
    events: &[String],
    shutdown: impl Future<Output = ()>,
) -> Result<u64, CliError> {
    bridge.initialize().await?;

    let received = Arc::new(AtomicU64::new(0));
    let subscriptions: Vec<_> = events
        .iter()
        .map(|event| {
            let received = Arc::clone(&received);
            let name = event.clone();
            bridge.subscribe(event.as_str(), move |payload| {
                received.fetch_add(1, Ordering::Relaxed);
                info!("{name}: {payload}");
            })
        })
        .collect();

    info!("Watching {}", events.join(", "));
    shutdown.await;

    for subscription in subscriptions {
        subscription.unsubscribe();
    }
    bridge.disconnect().await;

    Ok(received.load(Ordering::Relaxed))
}
