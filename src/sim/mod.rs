//! Synthetic producers that keep the scheduler busy without a user in the loop.

pub mod traffic;
pub use traffic::{TrafficGenerator, TrafficHandle};
