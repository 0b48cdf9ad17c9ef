//! Builder to assemble an [`OrderScheduler`] from configuration and collaborators.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::SchedulerConfig;
use crate::core::{
    AuditSink, CompletionGateway, Coordinator, InMemoryAuditSink, OrderScheduler, SchedulerError,
};
use crate::util::clock::{Clock, SystemClock};

/// Step-by-step construction of an [`OrderScheduler`].
///
/// ```rust,ignore
/// let store = Arc::new(InMemoryStore::new());
/// let mut builder = SchedulerBuilder::new(Arc::clone(&store))
///     .config(SchedulerConfig::from_env()?);
/// let audit = builder.in_memory_audit();
/// let scheduler = builder.build()?;
/// scheduler.start()?;
/// ```
pub struct SchedulerBuilder<G> {
    gateway: G,
    config: SchedulerConfig,
    clock: Arc<dyn Clock>,
    coordinator: Coordinator,
    audit: Option<Box<dyn AuditSink>>,
}

impl<G: CompletionGateway> SchedulerBuilder<G> {
    /// Start from default configuration, the system clock and a fresh coordinator.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            config: SchedulerConfig::default(),
            clock: Arc::new(SystemClock),
            coordinator: Coordinator::new(),
            audit: None,
        }
    }

    /// Use `config`.
    #[must_use]
    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `clock` for scores, deadlines and delays.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Share an existing coordinator, e.g. with another console.
    #[must_use]
    pub fn coordinator(mut self, coordinator: Coordinator) -> Self {
        self.coordinator = coordinator;
        self
    }

    /// Record audit rows into `sink`.
    #[must_use]
    pub fn audit(mut self, sink: Box<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Record audit rows into a bounded in-memory sink sized by the configured
    /// `audit_capacity`, returning a handle for reading them back.
    ///
    /// Call after [`config`](Self::config) so the capacity is taken from the final
    /// configuration.
    #[must_use]
    pub fn in_memory_audit(&mut self) -> Arc<Mutex<InMemoryAuditSink>> {
        let sink = Arc::new(Mutex::new(InMemoryAuditSink::new(self.config.audit_capacity)));
        self.audit = Some(Box::new(Arc::clone(&sink)));
        sink
    }

    /// Validate the configuration and build the scheduler. The worker is not started.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::InvalidConfig`] if validation fails.
    pub fn build(self) -> Result<OrderScheduler<G>, SchedulerError> {
        self.config
            .validate()
            .map_err(SchedulerError::InvalidConfig)?;
        Ok(OrderScheduler::from_parts(
            self.config,
            self.gateway,
            self.clock,
            self.coordinator,
            self.audit,
        ))
    }

    /// [`build`](Self::build) and start the worker thread.
    ///
    /// # Errors
    ///
    /// Configuration or thread spawn failures.
    pub fn build_started(self) -> Result<Arc<OrderScheduler<G>>, SchedulerError> {
        let scheduler = Arc::new(self.build()?);
        scheduler.start()?;
        Ok(scheduler)
    }
}
