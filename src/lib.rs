//! # Order Admission
//!
//! Priority-aware order admission for a retail order and stock manager.
//!
//! Orders arrive from many producers (an interactive front end, administrators, a
//! simulated traffic generator) and are completed one at a time by a single dedicated
//! worker thread. Waiting requests are ranked by a score that combines the customer's tier
//! with how long the request has been waiting, so Premium customers go first without
//! Standard customers starving.
//!
//! ## Key Features
//!
//! - **Aging priority**: `score = base(tier) + 0.5 * wait_seconds`, Premium base 20,
//!   Standard base 10, recomputed at every selection
//! - **Single worker**: exactly one request in flight, with a processing deadline
//! - **Coordinated completion**: order creation, finalization and tier promotion run under
//!   a reentrant lock shared with administrative writes
//! - **Event streams**: log lines, queue snapshots, results and a processing indicator
//!   fan out to any number of subscribers
//! - **Audit trail**: every enqueue, pickup and outcome can be recorded to a sink
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use order_admission::builders::SchedulerBuilder;
//! use order_admission::config::SchedulerConfig;
//! use order_admission::core::{CustomerRef, OrderRequest, ProductRef, Tier};
//! use order_admission::infra::InMemoryStore;
//! use order_admission::util::now_ms;
//!
//! let store = Arc::new(InMemoryStore::new());
//! let customer = store.add_customer("Ayla", 1_500.0, Tier::Standard, 0.0);
//! let product = store.insert_product("Sneakers", 20, 90.0, "Shoes");
//!
//! let scheduler = SchedulerBuilder::new(Arc::clone(&store))
//!     .config(SchedulerConfig::from_env()?)
//!     .build_started()?;
//! let results = scheduler.subscribe();
//!
//! scheduler.enqueue(OrderRequest::new(
//!     CustomerRef { id: customer, name: "Ayla".into(), tier: Tier::Standard },
//!     ProductRef { id: product, name: "Sneakers".into(), unit_price: 90.0 },
//!     2,
//!     now_ms(),
//! )?);
//!
//! // ...
//! scheduler.shutdown_and_wait();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Requests, scoring, the admission queue, the scheduler loop and its collaborators.
pub mod core;
/// Configuration models for the scheduler.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Infrastructure adapters for the persistence boundary.
pub mod infra;
/// Async adapters (tokio).
#[cfg(feature = "tokio-runtime")]
pub mod runtime;
/// Simulated order traffic.
pub mod sim;
/// Shared utilities.
pub mod util;
