//! Single-worker order admission scheduler.
//!
//! One dedicated OS thread repeatedly takes the highest-scoring request from the
//! [`AdmissionQueue`], waits out the simulated downstream latency, checks the processing
//! deadline and then runs the completion protocol against the [`CompletionGateway`]
//! while holding the [`Coordinator`] lock. Exactly one request is in flight at a time.
//!
//! ```text
//!  Idle --queue non-empty--> Processing --latency--> TimedOut ---> Idle
//!                                              \--> Completing -> Idle
//!  any --shutdown--> Stopped
//! ```
//!
//! Producers on any thread call [`OrderScheduler::enqueue`]; listeners subscribe to the
//! [`EventBus`]. Shutdown is cooperative: the stop flag is checked before every
//! dequeue, so an in-flight request always finishes (or times out) first.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::core::admission::AdmissionQueue;
use crate::core::audit::{customer_record, request_record, AuditRecord, AuditSink};
use crate::core::coordinator::Coordinator;
use crate::core::error::{GatewayError, OutcomeKind, SchedulerError};
use crate::core::events::{EventBus, EventKind, LogLevel, SchedulerEvent};
use crate::core::gateway::CompletionGateway;
use crate::core::request::{OrderId, OrderRequest, SnapshotEntry, Tier};
use crate::util::clock::{Clock, SystemClock};

/// Lifecycle state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// Nothing in flight; polling the queue.
    Idle,
    /// A request was picked up and its simulated work is running.
    Processing,
    /// The in-flight request missed its deadline and is being discarded.
    TimedOut,
    /// The completion protocol is running under the coordinator lock.
    Completing,
    /// Terminal; no further requests will be dequeued.
    Stopped,
}

/// Counters describing scheduler activity so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Requests accepted by `enqueue`.
    pub enqueued: u64,
    /// Requests taken off the queue and driven to an outcome.
    pub processed: u64,
    /// Requests whose order was created and completed.
    pub succeeded: u64,
    /// Requests rejected by the gateway.
    pub failed: u64,
    /// Requests that missed the processing deadline.
    pub timed_out: u64,
    /// Customers promoted to Premium.
    pub promotions: u64,
    /// Requests currently waiting.
    pub queued: usize,
}

#[derive(Debug, Default)]
struct SchedulerCounters {
    enqueued: AtomicU64,
    processed: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
    promotions: AtomicU64,
}

impl SchedulerCounters {
    fn snapshot(&self, queued: usize) -> SchedulerStats {
        SchedulerStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
            queued,
        }
    }
}

/// What happened to one dequeued request.
#[derive(Debug)]
pub struct CycleReport {
    /// The request, with its processing start time set.
    pub request: OrderRequest,
    /// Outcome classification (also published as a result event).
    pub outcome: OutcomeKind,
    /// Outcome message (also published as a result event).
    pub message: String,
    /// Order created by the gateway on success.
    pub order_id: Option<OrderId>,
    /// Whether the customer was promoted to Premium by this cycle.
    pub promoted: bool,
}

/// State shared between the handle and the worker thread.
struct Shared<G> {
    config: SchedulerConfig,
    queue: AdmissionQueue,
    gateway: G,
    coordinator: Coordinator,
    events: EventBus,
    audit: Option<Mutex<Box<dyn AuditSink>>>,
    clock: Arc<dyn Clock>,
    state: Mutex<SchedulerState>,
    stop: AtomicBool,
    /// Held for the duration of a cycle so manual and worker cycles never overlap.
    cycle: Mutex<()>,
    counters: SchedulerCounters,
}

impl<G: CompletionGateway> Shared<G> {
    fn set_state(&self, state: SchedulerState) {
        *self.state.lock() = state;
    }

    fn record(&self, record: AuditRecord) {
        if let Some(audit) = &self.audit {
            audit.lock().record(record);
        }
    }

    fn publish_snapshot(&self) {
        let entries = self.queue.snapshot(self.clock.now_ms());
        self.events.publish(&SchedulerEvent::Snapshot { entries });
    }

    fn publish_result(&self, outcome: OutcomeKind, message: &str) {
        self.events.publish(&SchedulerEvent::Result {
            outcome,
            message: message.to_owned(),
        });
    }

    /// Run one full cycle if a request is pending and no stop was requested.
    ///
    /// Caller holds the `cycle` lock. The coordinator is only taken after it, so a
    /// thread already holding the coordinator must never wait on `cycle`.
    fn run_cycle(&self) -> Option<CycleReport> {
        if self.stop.load(Ordering::Acquire) {
            return None;
        }
        let mut request = self.queue.select_highest(self.clock.now_ms())?;
        let started_at = request.mark_processing_started(self.clock.now_ms());

        self.set_state(SchedulerState::Processing);
        self.events.publish(&SchedulerEvent::Processing { active: true });
        self.events
            .log(LogLevel::Info, format!("Processing: {}", request.summary()));
        self.record(request_record(
            &request,
            LogLevel::Info,
            "Picked up for processing",
            None,
            started_at,
        ));
        debug!(
            customer_id = request.customer_id(),
            product_id = request.product_id(),
            quantity = request.quantity(),
            "request picked up"
        );

        self.clock.sleep(self.config.work_latency());

        let elapsed_ms = self.clock.now_ms().saturating_sub(started_at);
        let report = if elapsed_ms >= self.config.timeout().as_millis() {
            self.time_out(request)
        } else {
            self.set_state(SchedulerState::Completing);
            self.coordinator.run(|| self.complete(request))
        };

        self.counters.processed.fetch_add(1, Ordering::Relaxed);
        self.publish_snapshot();
        self.set_state(if self.stop.load(Ordering::Acquire) {
            SchedulerState::Stopped
        } else {
            SchedulerState::Idle
        });
        self.events.publish(&SchedulerEvent::Processing { active: false });
        Some(report)
    }

    fn time_out(&self, request: OrderRequest) -> CycleReport {
        self.set_state(SchedulerState::TimedOut);
        let message = format!(
            "Timed out: {} / {}",
            request.customer().name,
            request.product().name
        );
        self.events.log(LogLevel::Error, message.clone());
        self.record(request_record(
            &request,
            LogLevel::Error,
            "Timed out",
            None,
            self.clock.now_ms(),
        ));
        self.counters.timed_out.fetch_add(1, Ordering::Relaxed);
        self.publish_result(OutcomeKind::Timeout, &message);
        CycleReport {
            request,
            outcome: OutcomeKind::Timeout,
            message,
            order_id: None,
            promoted: false,
        }
    }

    /// Completion protocol. Caller holds the coordinator lock.
    fn complete(&self, request: OrderRequest) -> CycleReport {
        let placed = self
            .gateway
            .create_order(request.customer_id(), request.product_id(), request.quantity())
            .and_then(|order_id| {
                debug!(order_id, "order created");
                self.gateway.complete_order(order_id).map(|()| order_id)
            });

        match placed {
            Ok(order_id) => {
                let message = format!("Completed: {}", request.summary());
                self.events.log(LogLevel::Info, message.clone());
                self.record(request_record(
                    &request,
                    LogLevel::Info,
                    message.as_str(),
                    Some(order_id),
                    self.clock.now_ms(),
                ));
                let promoted = self.promote_if_eligible(&request);
                self.counters.succeeded.fetch_add(1, Ordering::Relaxed);
                self.publish_result(OutcomeKind::Success, &message);
                CycleReport {
                    request,
                    outcome: OutcomeKind::Success,
                    message,
                    order_id: Some(order_id),
                    promoted,
                }
            }
            Err(err) => self.fail(request, &err),
        }
    }

    fn fail(&self, request: OrderRequest, err: &GatewayError) -> CycleReport {
        let outcome = err.outcome_kind();
        let message = err.to_string();
        self.events.log(LogLevel::Error, message.clone());
        let result_text = match outcome {
            OutcomeKind::InsufficientStock => "Insufficient stock".to_owned(),
            OutcomeKind::InsufficientBudget => "Insufficient budget".to_owned(),
            _ => format!("Data store error: {message}"),
        };
        self.record(request_record(
            &request,
            LogLevel::Error,
            result_text,
            None,
            self.clock.now_ms(),
        ));
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        self.publish_result(outcome, &message);
        CycleReport {
            request,
            outcome,
            message,
            order_id: None,
            promoted: false,
        }
    }

    /// Re-read the customer and upgrade them once their spend crosses the threshold.
    ///
    /// Failures here do not change the cycle's outcome; the order is already complete.
    fn promote_if_eligible(&self, request: &OrderRequest) -> bool {
        let customer = match self.gateway.fetch_customer(request.customer_id()) {
            Ok(customer) => customer,
            Err(err) => {
                self.events.log(
                    LogLevel::Error,
                    format!("Promotion check skipped for {}: {err}", request.customer().name),
                );
                self.record(request_record(
                    request,
                    LogLevel::Error,
                    format!("Promotion check failed: {err}"),
                    None,
                    self.clock.now_ms(),
                ));
                return false;
            }
        };

        if customer.tier == Tier::Premium
            || customer.total_spent < self.config.promotion_threshold
        {
            return false;
        }

        match self.gateway.promote_tier(customer.id, Tier::Premium) {
            Ok(()) => {
                self.counters.promotions.fetch_add(1, Ordering::Relaxed);
                self.events.log(
                    LogLevel::Info,
                    format!("{} is now a Premium customer", customer.name),
                );
                self.record(customer_record(
                    customer.id,
                    customer.tier,
                    "Promoted to Premium",
                    self.clock.now_ms(),
                ));
                true
            }
            Err(err) => {
                self.events.log(
                    LogLevel::Error,
                    format!("Promotion of {} failed: {err}", customer.name),
                );
                false
            }
        }
    }
}

fn run_loop<G: CompletionGateway>(shared: &Shared<G>) {
    info!(
        timeout_secs = shared.config.timeout_secs,
        idle_poll_ms = shared.config.idle_poll_ms,
        work_latency_ms = shared.config.work_latency_ms,
        "order scheduler worker started"
    );
    while !shared.stop.load(Ordering::Acquire) {
        let report = {
            let _cycle = shared.cycle.lock();
            shared.run_cycle()
        };
        if report.is_none() {
            shared.clock.sleep(shared.config.idle_poll());
        }
    }
    shared.set_state(SchedulerState::Stopped);
    shared.events.log(LogLevel::Info, "Scheduler stopped");
    info!("order scheduler worker exiting");
}

struct Worker {
    handle: JoinHandle<()>,
    /// Disconnects when the worker thread exits.
    exited: Receiver<()>,
}

/// Order admission scheduler with one dedicated worker thread.
///
/// Construct with [`OrderScheduler::new`] or [`crate::builders::SchedulerBuilder`], call
/// [`start`](Self::start) to spawn the worker and [`shutdown`](Self::shutdown) /
/// [`wait`](Self::wait) to stop it. Without `start`, cycles can be driven by hand with
/// [`process_next`](Self::process_next).
pub struct OrderScheduler<G: CompletionGateway> {
    shared: Arc<Shared<G>>,
    worker: Mutex<Option<Worker>>,
}

impl<G: CompletionGateway> OrderScheduler<G> {
    /// Create a stopped-but-not-started scheduler on the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: SchedulerConfig, gateway: G) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;
        Ok(Self::from_parts(
            config,
            gateway,
            Arc::new(SystemClock),
            Coordinator::new(),
            None,
        ))
    }

    pub(crate) fn from_parts(
        config: SchedulerConfig,
        gateway: G,
        clock: Arc<dyn Clock>,
        coordinator: Coordinator,
        audit: Option<Box<dyn AuditSink>>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                queue: AdmissionQueue::new(),
                gateway,
                coordinator,
                events: EventBus::new(),
                audit: audit.map(Mutex::new),
                clock,
                state: Mutex::new(SchedulerState::Idle),
                stop: AtomicBool::new(false),
                cycle: Mutex::new(()),
                counters: SchedulerCounters::default(),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Spawn the worker thread.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::AlreadyStarted`] if the worker is already running
    /// - [`SchedulerError::Stopped`] after `shutdown`
    /// - [`SchedulerError::Spawn`] if the OS refused to create the thread
    pub fn start(&self) -> Result<(), SchedulerError> {
        if self.shared.stop.load(Ordering::Acquire) {
            return Err(SchedulerError::Stopped);
        }
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Err(SchedulerError::AlreadyStarted);
        }

        let (exited_tx, exited_rx) = crossbeam_channel::bounded::<()>(0);
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("order-scheduler".into())
            .spawn(move || {
                let _exited = exited_tx;
                run_loop(&shared);
            })?;

        *worker = Some(Worker {
            handle,
            exited: exited_rx,
        });
        drop(worker);
        self.shared.events.log(LogLevel::Info, "Scheduler started");
        Ok(())
    }

    /// Add a request to the admission queue. Always accepted.
    pub fn enqueue(&self, request: OrderRequest) {
        let shared = &self.shared;
        let summary = request.summary();
        shared.record(request_record(
            &request,
            LogLevel::Info,
            "Queued",
            None,
            shared.clock.now_ms(),
        ));
        debug!(
            customer_id = request.customer_id(),
            product_id = request.product_id(),
            quantity = request.quantity(),
            "request enqueued"
        );
        shared.queue.enqueue(request);
        shared.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        shared.events.log(LogLevel::Info, format!("Queued: {summary}"));
        shared.publish_snapshot();
    }

    /// Drive one cycle on the calling thread when no worker thread was started.
    ///
    /// Returns `None` if the queue is empty, shutdown was requested, the worker thread
    /// owns the queue, or another manual cycle is in progress. Never blocks waiting for
    /// a cycle, so it may be called while holding the coordinator lock.
    pub fn process_next(&self) -> Option<CycleReport> {
        if self.worker.lock().is_some() {
            return None;
        }
        let _cycle = self.shared.cycle.try_lock()?;
        self.shared.run_cycle()
    }

    /// Request a graceful stop. The current cycle, if any, runs to completion.
    pub fn shutdown(&self) {
        if self.shared.stop.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("order scheduler shutdown requested");
        self.shared.events.log(LogLevel::Info, "Shutdown requested");
        if self.worker.lock().is_none() {
            self.shared.set_state(SchedulerState::Stopped);
        }
    }

    /// Wait up to `timeout` for the worker thread to exit.
    ///
    /// Returns `true` once the worker has exited (or was never started) and `false` if
    /// it is still running when the timeout expires.
    pub fn wait(&self, timeout: Duration) -> bool {
        let exited = match self.worker.lock().as_ref() {
            Some(worker) => worker.exited.clone(),
            None => return true,
        };
        if matches!(exited.recv_timeout(timeout), Err(RecvTimeoutError::Timeout)) {
            warn!(
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "order scheduler worker did not exit within timeout"
            );
            return false;
        }
        if let Some(worker) = self.worker.lock().take() {
            if worker.handle.join().is_err() {
                warn!("order scheduler worker panicked");
            }
        }
        true
    }

    /// [`shutdown`](Self::shutdown) then [`wait`](Self::wait) for the configured grace
    /// period.
    pub fn shutdown_and_wait(&self) -> bool {
        self.shutdown();
        self.wait(self.shared.config.shutdown_grace())
    }

    /// Whether the worker thread is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Subscribe to every event stream.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<SchedulerEvent> {
        self.shared.events.subscribe()
    }

    /// Subscribe to a single event stream.
    #[must_use]
    pub fn subscribe_kind(&self, kind: EventKind) -> Receiver<SchedulerEvent> {
        self.shared.events.subscribe_kind(kind)
    }

    /// Event bus shared with administrative producers.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    /// Coordinator lock shared with administrative producers.
    #[must_use]
    pub fn coordinator(&self) -> &Coordinator {
        &self.shared.coordinator
    }

    /// Current queue contents, highest score first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SnapshotEntry> {
        self.shared.queue.snapshot(self.shared.clock.now_ms())
    }

    /// Number of waiting requests.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.shared.queue.len()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        *self.shared.state.lock()
    }

    /// Activity counters.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.shared.counters.snapshot(self.shared.queue.len())
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// The gateway this scheduler drives.
    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.shared.gateway
    }

    /// Clock used for scores and deadlines.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.shared.clock
    }
}

impl<G: CompletionGateway> Drop for OrderScheduler<G> {
    fn drop(&mut self) {
        // Signal the worker but don't join: it exits after its current cycle.
        if !self.shared.stop.swap(true, Ordering::AcqRel) {
            debug!("OrderScheduler dropped without explicit shutdown - worker will be detached");
        }
    }
}
