//! Audit trail of scheduler activity.
//!
//! One record per enqueue, pickup, timeout, completion, failure and promotion. Sinks
//! are best effort: recording never fails a scheduling cycle.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::events::LogLevel;
use crate::core::request::{CustomerId, OrderId, OrderRequest, Tier};

/// One audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique record identifier (uuid v4).
    pub record_id: String,
    /// Severity.
    pub level: LogLevel,
    /// Customer involved, if any.
    pub customer_id: Option<CustomerId>,
    /// Customer tier at the time of the record.
    pub customer_tier: Option<Tier>,
    /// Product involved, if any.
    pub product_name: Option<String>,
    /// Quantity involved, if any.
    pub quantity: Option<u32>,
    /// What happened.
    pub result_text: String,
    /// Order created by the store, if one was.
    pub order_id: Option<OrderId>,
    /// Timestamp in milliseconds since epoch.
    pub created_at_ms: u128,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit row.
    fn record(&mut self, record: AuditRecord);
}

/// Bounded in-memory sink; the oldest record is evicted when full.
#[derive(Debug)]
pub struct InMemoryAuditSink {
    records: VecDeque<AuditRecord>,
    max_records: usize,
}

impl InMemoryAuditSink {
    /// Create a sink holding at most `max_records` rows.
    #[must_use]
    pub fn new(max_records: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_records.min(1024)),
            max_records,
        }
    }

    /// Snapshot of stored records, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, record: AuditRecord) {
        if self.max_records == 0 {
            return;
        }
        if self.records.len() >= self.max_records {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }
}

impl<S: AuditSink + ?Sized> AuditSink for std::sync::Arc<parking_lot::Mutex<S>> {
    fn record(&mut self, record: AuditRecord) {
        self.lock().record(record);
    }
}

/// Build an audit record describing `request`.
pub fn request_record(
    request: &OrderRequest,
    level: LogLevel,
    result_text: impl Into<String>,
    order_id: Option<OrderId>,
    created_at_ms: u128,
) -> AuditRecord {
    AuditRecord {
        record_id: uuid::Uuid::new_v4().to_string(),
        level,
        customer_id: Some(request.customer_id()),
        customer_tier: Some(request.customer_tier()),
        product_name: Some(request.product().name.clone()),
        quantity: Some(request.quantity()),
        result_text: result_text.into(),
        order_id,
        created_at_ms,
    }
}

/// Build an audit record about a customer only (tier changes).
pub fn customer_record(
    customer_id: CustomerId,
    tier: Tier,
    result_text: impl Into<String>,
    created_at_ms: u128,
) -> AuditRecord {
    AuditRecord {
        record_id: uuid::Uuid::new_v4().to_string(),
        level: LogLevel::Info,
        customer_id: Some(customer_id),
        customer_tier: Some(tier),
        product_name: None,
        quantity: None,
        result_text: result_text.into(),
        order_id: None,
        created_at_ms,
    }
}
