//! Fire-and-forget event fan-out.
//!
//! Every subscriber gets its own unbounded crossbeam channel. Publishing never waits
//! for a listener; subscribers whose receiver was dropped are pruned on the next publish.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::error::OutcomeKind;
use crate::core::request::SnapshotEntry;

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Normal progress.
    Info,
    /// A failed or abandoned request.
    Error,
}

/// Something the scheduler wants listeners to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchedulerEvent {
    /// Human readable progress line.
    Log {
        /// Severity tag.
        level: LogLevel,
        /// Free text.
        message: String,
    },
    /// Full queue contents, highest score first.
    Snapshot {
        /// Ordered snapshot rows.
        entries: Vec<SnapshotEntry>,
    },
    /// Outcome of one processed request.
    Result {
        /// Classification.
        outcome: OutcomeKind,
        /// Free text.
        message: String,
    },
    /// Whether a request is currently in flight.
    Processing {
        /// `true` on pickup, `false` when the cycle ends.
        active: bool,
    },
}

impl SchedulerEvent {
    /// The stream this event belongs to.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Log { .. } => EventKind::Log,
            Self::Snapshot { .. } => EventKind::Snapshot,
            Self::Result { .. } => EventKind::Result,
            Self::Processing { .. } => EventKind::Processing,
        }
    }
}

/// Event stream selector for filtered subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// [`SchedulerEvent::Log`].
    Log,
    /// [`SchedulerEvent::Snapshot`].
    Snapshot,
    /// [`SchedulerEvent::Result`].
    Result,
    /// [`SchedulerEvent::Processing`].
    Processing,
}

struct Subscriber {
    filter: Option<EventKind>,
    tx: Sender<SchedulerEvent>,
}

/// Publisher handle. Clones share the same subscriber list.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventBus {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<SchedulerEvent> {
        self.add(None)
    }

    /// Receive only events of `kind`.
    #[must_use]
    pub fn subscribe_kind(&self, kind: EventKind) -> Receiver<SchedulerEvent> {
        self.add(Some(kind))
    }

    fn add(&self, filter: Option<EventKind>) -> Receiver<SchedulerEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(Subscriber { filter, tx });
        rx
    }

    /// Deliver `event` to every matching subscriber.
    pub fn publish(&self, event: &SchedulerEvent) {
        let kind = event.kind();
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|sub| {
            if sub.filter.is_some_and(|f| f != kind) {
                return true;
            }
            sub.tx.send(event.clone()).is_ok()
        });
        let removed = before - subscribers.len();
        if removed > 0 {
            tracing::debug!(removed, "pruned disconnected event subscribers");
        }
    }

    /// Publish a log line and mirror it to `tracing`.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info => tracing::info!(target: "order_admission::events", "{message}"),
            LogLevel::Error => tracing::error!(target: "order_admission::events", "{message}"),
        }
        self.publish(&SchedulerEvent::Log { level, message });
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
