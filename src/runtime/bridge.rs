//! Tokio bridge for the blocking scheduler API.
//!
//! The scheduler runs on its own OS thread and publishes on crossbeam channels; these
//! helpers move event delivery and shutdown waits off the async executor.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Receiver;
use tokio::sync::mpsc;
use tracing::debug;

use crate::core::{CompletionGateway, OrderScheduler, SchedulerError, SchedulerEvent};

/// Forward a blocking event subscription into a tokio channel.
///
/// A dedicated thread relays events until the subscription disconnects. Once the
/// returned receiver is dropped the thread exits on the next event.
///
/// # Errors
///
/// [`SchedulerError::Spawn`] if the relay thread could not be created.
pub fn forward_events(
    events: Receiver<SchedulerEvent>,
) -> Result<mpsc::UnboundedReceiver<SchedulerEvent>, SchedulerError> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::Builder::new()
        .name("order-events-bridge".into())
        .spawn(move || {
            for event in events.iter() {
                if tx.send(event).is_err() {
                    break;
                }
            }
            debug!("event bridge closed");
        })?;
    Ok(rx)
}

/// Wait up to `timeout` for the worker to exit without blocking the executor.
///
/// Returns `true` once the worker has exited.
pub async fn wait_for_stop<G: CompletionGateway>(
    scheduler: Arc<OrderScheduler<G>>,
    timeout: Duration,
) -> bool {
    tokio::task::spawn_blocking(move || scheduler.wait(timeout))
        .await
        .unwrap_or(false)
}

/// Request shutdown and wait out the configured grace period.
pub async fn shutdown_async<G: CompletionGateway>(scheduler: Arc<OrderScheduler<G>>) -> bool {
    scheduler.shutdown();
    let grace = scheduler.config().shutdown_grace();
    wait_for_stop(scheduler, grace).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::SchedulerBuilder;
    use crate::config::SchedulerConfig;
    use crate::core::{CustomerRef, EventKind, OrderRequest, OutcomeKind, ProductRef, Tier};
    use crate::infra::InMemoryStore;
    use crate::util::clock::{Clock, ManualClock};

    fn scheduler() -> (Arc<OrderScheduler<Arc<InMemoryStore>>>, Arc<ManualClock>) {
        let store = Arc::new(InMemoryStore::new());
        store.add_customer("Ayla", 1_000.0, Tier::Standard, 0.0);
        store.insert_product("Gloves", 4, 30.0, "Accessories");
        let clock = Arc::new(ManualClock::new(0));
        let scheduler = SchedulerBuilder::new(store)
            .config(SchedulerConfig::default())
            .clock(Arc::clone(&clock) as Arc<dyn Clock>)
            .build()
            .unwrap();
        (Arc::new(scheduler), clock)
    }

    #[tokio::test]
    async fn test_forwarded_results_arrive_async() {
        let (scheduler, clock) = scheduler();
        let mut results = forward_events(scheduler.subscribe_kind(EventKind::Result)).unwrap();
        scheduler.start().unwrap();

        let request = OrderRequest::new(
            CustomerRef {
                id: 1,
                name: "Ayla".into(),
                tier: Tier::Standard,
            },
            ProductRef {
                id: 1,
                name: "Gloves".into(),
                unit_price: 30.0,
            },
            1,
            clock.now_ms(),
        )
        .unwrap();
        scheduler.enqueue(request);

        let event = tokio::time::timeout(Duration::from_secs(5), results.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            event,
            SchedulerEvent::Result {
                outcome: OutcomeKind::Success,
                ..
            }
        ));

        assert!(shutdown_async(Arc::clone(&scheduler)).await);
    }

    #[tokio::test]
    async fn test_wait_for_stop_without_worker() {
        let (scheduler, _) = scheduler();
        scheduler.shutdown();
        assert!(wait_for_stop(scheduler, Duration::from_millis(10)).await);
    }
}
