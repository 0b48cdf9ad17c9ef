//! Async adapters for embedding the scheduler in a tokio application.

pub mod bridge;

pub use bridge::{forward_events, shutdown_async, wait_for_stop};
