//! Configuration models for the scheduler and its producers.

pub mod scheduler;

pub use scheduler::{SchedulerConfig, ENV_PREFIX};
