//! Infrastructure adapters for the persistence boundary.

pub mod memory;
pub use memory::{InMemoryStore, OrderRecord, OrderStatus};
