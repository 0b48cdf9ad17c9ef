//! Tests for builder modules

use std::sync::Arc;

use order_admission::builders::SchedulerBuilder;
use order_admission::config::SchedulerConfig;
use order_admission::core::{Coordinator, SchedulerError, SchedulerState};
use order_admission::infra::InMemoryStore;

#[test]
fn test_scheduler_builder_defaults() {
    let scheduler = SchedulerBuilder::new(InMemoryStore::new()).build().unwrap();
    assert_eq!(scheduler.config(), &SchedulerConfig::default());
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    assert!(!scheduler.is_running());
    assert_eq!(scheduler.queue_len(), 0);
}

#[test]
fn test_scheduler_builder_shares_coordinator() {
    let coordinator = Coordinator::new();
    let scheduler = SchedulerBuilder::new(Arc::new(InMemoryStore::new()))
        .coordinator(coordinator.clone())
        .build()
        .unwrap();

    let _held = coordinator.lock();
    assert!(scheduler.coordinator().is_locked());
}

#[test]
fn test_scheduler_builder_rejects_invalid_config() {
    let result = SchedulerBuilder::new(InMemoryStore::new())
        .config(SchedulerConfig::new().with_idle_poll_ms(0))
        .build();
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[test]
fn test_build_started_spawns_worker() {
    let scheduler = SchedulerBuilder::new(InMemoryStore::new())
        .config(SchedulerConfig::new().with_idle_poll_ms(5))
        .build_started()
        .unwrap();
    assert!(scheduler.is_running());
    assert!(scheduler.shutdown_and_wait());
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
}
