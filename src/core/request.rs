//! Order requests, customer tiers and queue snapshot entries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::RequestError;

/// Customer identifier in the persistence layer.
pub type CustomerId = u64;
/// Product identifier in the persistence layer.
pub type ProductId = u64;
/// Order identifier returned by the persistence layer.
pub type OrderId = u64;

/// Customer classification driving base scheduling priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tier {
    /// Regular customer.
    #[default]
    Standard,
    /// Customer with a 10 point scheduling head start.
    Premium,
}

impl Tier {
    /// Base score a request starts with before any waiting time is added.
    #[must_use]
    pub const fn base_priority(self) -> f64 {
        match self {
            Self::Premium => 20.0,
            Self::Standard => 10.0,
        }
    }

    /// Stable name used in logs and audit records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Premium => "Premium",
            Self::Standard => "Standard",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "premium" => Ok(Self::Premium),
            "standard" => Ok(Self::Standard),
            other => Err(format!("unknown customer tier `{other}`")),
        }
    }
}

/// The customer side of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    /// Customer identifier.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Tier at the time the request was created.
    pub tier: Tier,
}

/// The product side of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Price seen by the producer. Informational; the store re-reads the price.
    pub unit_price: f64,
}

/// One order attempt waiting for (or undergoing) admission.
///
/// A request is deliberately not `Clone`: it lives either in the admission queue or in
/// the scheduler's hands, never both. The only field that changes after construction is
/// the processing start time, which the scheduler sets once on dequeue.
#[derive(Debug, Serialize)]
pub struct OrderRequest {
    customer: CustomerRef,
    product: ProductRef,
    quantity: u32,
    enqueued_at_ms: u128,
    processing_started_at_ms: Option<u128>,
}

impl OrderRequest {
    /// Create a request stamped with its enqueue time.
    ///
    /// # Errors
    ///
    /// - [`RequestError::ZeroQuantity`] if `quantity` is 0
    /// - [`RequestError::InvalidPrice`] if the unit price is negative or not finite
    pub fn new(
        customer: CustomerRef,
        product: ProductRef,
        quantity: u32,
        enqueued_at_ms: u128,
    ) -> Result<Self, RequestError> {
        if quantity == 0 {
            return Err(RequestError::ZeroQuantity);
        }
        if !product.unit_price.is_finite() || product.unit_price < 0.0 {
            return Err(RequestError::InvalidPrice(product.unit_price));
        }
        Ok(Self {
            customer,
            product,
            quantity,
            enqueued_at_ms,
            processing_started_at_ms: None,
        })
    }

    /// Customer placing the order.
    #[must_use]
    pub const fn customer(&self) -> &CustomerRef {
        &self.customer
    }

    /// Product being ordered.
    #[must_use]
    pub const fn product(&self) -> &ProductRef {
        &self.product
    }

    /// Customer identifier.
    #[must_use]
    pub const fn customer_id(&self) -> CustomerId {
        self.customer.id
    }

    /// Customer tier captured at creation.
    #[must_use]
    pub const fn customer_tier(&self) -> Tier {
        self.customer.tier
    }

    /// Product identifier.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Units ordered (always > 0).
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Informational unit price.
    #[must_use]
    pub const fn unit_price(&self) -> f64 {
        self.product.unit_price
    }

    /// When the request entered the queue (ms since epoch).
    #[must_use]
    pub const fn enqueued_at_ms(&self) -> u128 {
        self.enqueued_at_ms
    }

    /// When the scheduler picked the request up, if it has.
    #[must_use]
    pub const fn processing_started_at_ms(&self) -> Option<u128> {
        self.processing_started_at_ms
    }

    /// Record the pickup time. Only the first call has an effect.
    pub(crate) fn mark_processing_started(&mut self, now_ms: u128) -> u128 {
        *self.processing_started_at_ms.get_or_insert(now_ms)
    }

    /// Short `customer -> product xN` description for log lines.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} -> {} x{}",
            self.customer.name, self.product.name, self.quantity
        )
    }
}

/// One row of a published queue snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Customer display name.
    pub customer_name: String,
    /// Customer tier.
    pub tier: Tier,
    /// Product display name.
    pub product_name: String,
    /// Units ordered.
    pub quantity: u32,
    /// Whole seconds spent waiting so far.
    pub wait_secs: u64,
    /// Current score rounded to one decimal.
    pub score: f64,
}
