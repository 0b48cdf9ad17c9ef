//! Persistence boundary consumed by the scheduler.
//!
//! The scheduler never touches storage directly. It drives a [`CompletionGateway`],
//! whose calls are synchronous and each run their own unit of work against the store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::GatewayError;
use crate::core::request::{CustomerId, OrderId, ProductId, Tier};

/// Customer row as seen by the scheduler and producers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Customer identifier.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Current tier.
    pub tier: Tier,
    /// Remaining budget.
    pub budget: f64,
    /// Lifetime spend across completed orders.
    pub total_spent: f64,
}

/// Product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Units on hand.
    pub stock: u32,
    /// Authoritative unit price.
    pub price: f64,
    /// Category used for browsing and simulated traffic.
    pub category: String,
}

/// Order creation/finalization contract driven by the scheduler.
pub trait CompletionGateway: Send + Sync + 'static {
    /// Create a pending order and return its identifier.
    ///
    /// # Errors
    ///
    /// `InsufficientStock`, `InsufficientBudget`, `NotFound` or `DataStore`.
    fn create_order(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<OrderId, GatewayError>;

    /// Finalize an order, applying its stock and budget effects.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] raised by the store.
    fn complete_order(&self, order_id: OrderId) -> Result<(), GatewayError>;

    /// Re-read a customer row.
    ///
    /// # Errors
    ///
    /// `NotFound` if the customer is gone, `DataStore` otherwise.
    fn fetch_customer(&self, customer_id: CustomerId) -> Result<CustomerRecord, GatewayError>;

    /// Set a customer's tier.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] raised by the store.
    fn promote_tier(&self, customer_id: CustomerId, tier: Tier) -> Result<(), GatewayError>;
}

/// Read-only listing of customers and products, used by producers.
pub trait Catalog: Send + Sync + 'static {
    /// All customers ordered by id.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] raised by the store.
    fn list_customers(&self) -> Result<Vec<CustomerRecord>, GatewayError>;

    /// All products ordered by id.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] raised by the store.
    fn list_products(&self) -> Result<Vec<ProductRecord>, GatewayError>;
}

impl<G: CompletionGateway + ?Sized> CompletionGateway for Arc<G> {
    fn create_order(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<OrderId, GatewayError> {
        (**self).create_order(customer_id, product_id, quantity)
    }

    fn complete_order(&self, order_id: OrderId) -> Result<(), GatewayError> {
        (**self).complete_order(order_id)
    }

    fn fetch_customer(&self, customer_id: CustomerId) -> Result<CustomerRecord, GatewayError> {
        (**self).fetch_customer(customer_id)
    }

    fn promote_tier(&self, customer_id: CustomerId, tier: Tier) -> Result<(), GatewayError> {
        (**self).promote_tier(customer_id, tier)
    }
}

impl<C: Catalog + ?Sized> Catalog for Arc<C> {
    fn list_customers(&self) -> Result<Vec<CustomerRecord>, GatewayError> {
        (**self).list_customers()
    }

    fn list_products(&self) -> Result<Vec<ProductRecord>, GatewayError> {
        (**self).list_products()
    }
}
