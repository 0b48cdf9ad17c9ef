//! Error types and outcome classification.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::request::{CustomerId, ProductId};

/// Failures reported by the persistence boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// Not enough units on hand to fill the order.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Product that ran short.
        product_id: ProductId,
        /// Units requested by the order.
        requested: u32,
        /// Units currently in stock.
        available: u32,
    },
    /// The customer's remaining budget does not cover the order total.
    #[error("insufficient budget for customer {customer_id}: required {required:.2}, available {available:.2}")]
    InsufficientBudget {
        /// Customer being charged.
        customer_id: CustomerId,
        /// Order total.
        required: f64,
        /// Remaining budget.
        available: f64,
    },
    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Any other store failure, carried as the store's message.
    #[error("data store error: {0}")]
    DataStore(String),
}

impl GatewayError {
    /// Map this failure onto the published outcome classification.
    ///
    /// Structured variants map directly. An untyped [`GatewayError::DataStore`] message is
    /// sniffed for stock/budget keywords, which is how stored-procedure errors that only
    /// surface as text get classified.
    #[must_use]
    pub fn outcome_kind(&self) -> OutcomeKind {
        match self {
            Self::InsufficientStock { .. } => OutcomeKind::InsufficientStock,
            Self::InsufficientBudget { .. } => OutcomeKind::InsufficientBudget,
            Self::NotFound(_) => OutcomeKind::NotFound,
            Self::DataStore(message) => classify_message(message),
        }
    }
}

/// Keyword fallback for failures that only carry a message.
#[must_use]
pub fn classify_message(message: &str) -> OutcomeKind {
    let lower = message.to_lowercase();
    if lower.contains("stock") || lower.contains("stok") {
        OutcomeKind::InsufficientStock
    } else if lower.contains("balance") || lower.contains("bakiye") || lower.contains("budget") {
        OutcomeKind::InsufficientBudget
    } else {
        OutcomeKind::DataStoreError
    }
}

/// Classification published with every result event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Order created and completed.
    Success,
    /// Deadline passed before the gateway was called.
    Timeout,
    /// Stock did not cover the quantity.
    InsufficientStock,
    /// Budget did not cover the total.
    InsufficientBudget,
    /// Generic store failure.
    DataStoreError,
    /// A referenced record was missing.
    NotFound,
}

impl OutcomeKind {
    /// Whether this outcome counts as a failure.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        !matches!(self, Self::Success)
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::Timeout => "timeout",
            Self::InsufficientStock => "insufficient stock",
            Self::InsufficientBudget => "insufficient budget",
            Self::DataStoreError => "data store error",
            Self::NotFound => "not found",
        };
        f.write_str(label)
    }
}

/// Errors produced by the scheduler lifecycle.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// `start` was called on a scheduler whose worker is already running.
    #[error("scheduler already started")]
    AlreadyStarted,
    /// The scheduler has been shut down and cannot be restarted.
    #[error("scheduler stopped")]
    Stopped,
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Errors rejecting a malformed order request at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// Quantity must be at least one.
    #[error("quantity must be greater than 0")]
    ZeroQuantity,
    /// Unit price must be a finite, non-negative number.
    #[error("unit price must be a non-negative number, got {0}")]
    InvalidPrice(f64),
}

/// Errors from administrative product/customer mutations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdminError {
    /// Product name was blank.
    #[error("product name must not be empty")]
    EmptyName,
    /// Category was blank.
    #[error("product category is required")]
    MissingCategory,
    /// Stock value was negative or too large.
    #[error("stock must be between 0 and {max}, got {0}", max = u32::MAX)]
    InvalidStock(i64),
    /// Price was negative or not a number.
    #[error("price must be a non-negative number, got {0}")]
    InvalidPrice(f64),
    /// The store rejected the mutation.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_errors_classify_directly() {
        let stock = GatewayError::InsufficientStock {
            product_id: 3,
            requested: 5,
            available: 2,
        };
        assert_eq!(stock.outcome_kind(), OutcomeKind::InsufficientStock);

        let budget = GatewayError::InsufficientBudget {
            customer_id: 1,
            required: 300.0,
            available: 120.5,
        };
        assert_eq!(budget.outcome_kind(), OutcomeKind::InsufficientBudget);

        let missing = GatewayError::NotFound("customer 9".into());
        assert_eq!(missing.outcome_kind(), OutcomeKind::NotFound);
    }

    #[test]
    fn test_untyped_messages_fall_back_to_keywords() {
        assert_eq!(
            GatewayError::DataStore("Yetersiz stok".into()).outcome_kind(),
            OutcomeKind::InsufficientStock
        );
        assert_eq!(
            GatewayError::DataStore("Out of STOCK".into()).outcome_kind(),
            OutcomeKind::InsufficientStock
        );
        assert_eq!(
            GatewayError::DataStore("Yetersiz bakiye".into()).outcome_kind(),
            OutcomeKind::InsufficientBudget
        );
        assert_eq!(
            GatewayError::DataStore("balance too low".into()).outcome_kind(),
            OutcomeKind::InsufficientBudget
        );
        assert_eq!(
            GatewayError::DataStore("deadlock detected".into()).outcome_kind(),
            OutcomeKind::DataStoreError
        );
    }

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::InsufficientBudget {
            customer_id: 4,
            required: 250.0,
            available: 99.999,
        };
        assert_eq!(
            err.to_string(),
            "insufficient budget for customer 4: required 250.00, available 100.00"
        );
    }

    #[test]
    fn test_outcome_failure_flag() {
        assert!(!OutcomeKind::Success.is_failure());
        assert!(OutcomeKind::Timeout.is_failure());
        assert!(OutcomeKind::NotFound.is_failure());
    }
}
