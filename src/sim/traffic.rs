//! Periodic random order traffic.
//!
//! Each tick picks a random customer (other than the one currently driven by hand), a
//! random category, a random product in it and a quantity in `1..=3`, then enqueues the
//! request at the catalog price.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::core::{
    Catalog, CompletionGateway, CustomerId, CustomerRef, GatewayError, OrderRequest,
    OrderScheduler, ProductRef, SchedulerError, SchedulerState,
};

/// Random request source over a [`Catalog`].
#[derive(Debug, Clone)]
pub struct TrafficGenerator<C> {
    catalog: C,
    exclude: Option<CustomerId>,
}

impl<C: Catalog> TrafficGenerator<C> {
    /// Generator drawing from every customer in `catalog`.
    pub const fn new(catalog: C) -> Self {
        Self {
            catalog,
            exclude: None,
        }
    }

    /// Never generate orders for `customer_id`.
    #[must_use]
    pub const fn excluding(mut self, customer_id: CustomerId) -> Self {
        self.exclude = Some(customer_id);
        self
    }

    /// Draw one request.
    ///
    /// Returns `Ok(None)` when there is no eligible customer or no product to order.
    ///
    /// # Errors
    ///
    /// Propagates catalog failures.
    pub fn next_request<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now_ms: u128,
    ) -> Result<Option<OrderRequest>, GatewayError> {
        let customers: Vec<_> = self
            .catalog
            .list_customers()?
            .into_iter()
            .filter(|c| Some(c.id) != self.exclude)
            .collect();
        let Some(customer) = customers.choose(rng) else {
            return Ok(None);
        };

        let products = self.catalog.list_products()?;
        let categories: Vec<&str> = products
            .iter()
            .map(|p| p.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let Some(category) = categories.choose(rng).copied() else {
            return Ok(None);
        };
        let in_category: Vec<_> = products.iter().filter(|p| p.category == category).collect();
        let Some(product) = in_category.choose(rng) else {
            return Ok(None);
        };

        let quantity = rng.random_range(1..=3u32);
        let request = OrderRequest::new(
            CustomerRef {
                id: customer.id,
                name: customer.name.clone(),
                tier: customer.tier,
            },
            ProductRef {
                id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
            },
            quantity,
            now_ms,
        );
        match request {
            Ok(request) => Ok(Some(request)),
            Err(err) => {
                warn!(product_id = product.id, error = %err, "skipping unorderable product");
                Ok(None)
            }
        }
    }

    /// Enqueue one random request into `scheduler` every `interval` on a named thread.
    ///
    /// The thread exits when the returned handle is stopped or dropped, or once the
    /// scheduler has stopped.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Spawn`] if the thread could not be created.
    pub fn spawn<G: CompletionGateway>(
        self,
        scheduler: Arc<OrderScheduler<G>>,
        interval: Duration,
    ) -> Result<TrafficHandle, SchedulerError> {
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let handle = thread::Builder::new()
            .name("order-traffic".into())
            .spawn(move || {
                info!(
                    interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
                    "traffic generator started"
                );
                let mut rng = rand::rng();
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    if scheduler.state() == SchedulerState::Stopped {
                        break;
                    }
                    match self.next_request(&mut rng, scheduler.clock().now_ms()) {
                        Ok(Some(request)) => scheduler.enqueue(request),
                        Ok(None) => debug!("no eligible customer or product for traffic"),
                        Err(err) => warn!(error = %err, "traffic generator catalog read failed"),
                    }
                }
                info!("traffic generator stopped");
            })?;
        Ok(TrafficHandle {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }
}

/// Running traffic thread. Dropping the handle stops the thread without joining it.
#[derive(Debug)]
pub struct TrafficHandle {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TrafficHandle {
    /// Stop generating and wait for the thread to exit. Later calls do nothing.
    pub fn stop(&mut self) {
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("traffic generator thread panicked");
            }
        }
    }

    /// Whether the thread is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}
