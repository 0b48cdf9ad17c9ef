//! In-memory stand-in for the relational store.
//!
//! Implements the completion, administrative and catalog contracts with the same
//! observable behavior as the stored procedures: creating an order checks stock and
//! budget, completing it applies the stock decrement, budget deduction and lifetime
//! spend increment.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::core::{
    AdminGateway, Catalog, CompletionGateway, CustomerId, CustomerRecord, GatewayError, OrderId,
    ProductDraft, ProductId, ProductRecord, Tier,
};

/// Lifecycle of a stored order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Created, effects not yet applied.
    Pending,
    /// Stock and budget effects applied.
    Completed,
}

/// Stored order row.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// Order identifier.
    pub id: OrderId,
    /// Ordering customer.
    pub customer_id: CustomerId,
    /// Ordered product.
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: u32,
    /// Price charged, fixed when the order was created.
    pub total_price: f64,
    /// Current status.
    pub status: OrderStatus,
}

#[derive(Debug, Default)]
struct StoreState {
    customers: BTreeMap<CustomerId, CustomerRecord>,
    products: BTreeMap<ProductId, ProductRecord>,
    orders: BTreeMap<OrderId, OrderRecord>,
    next_customer_id: CustomerId,
    next_product_id: ProductId,
    next_order_id: OrderId,
}

impl StoreState {
    fn customer(&self, id: CustomerId) -> Result<&CustomerRecord, GatewayError> {
        self.customers
            .get(&id)
            .ok_or_else(|| GatewayError::NotFound(format!("customer {id}")))
    }

    fn product(&self, id: ProductId) -> Result<&ProductRecord, GatewayError> {
        self.products
            .get(&id)
            .ok_or_else(|| GatewayError::NotFound(format!("product {id}")))
    }

    fn check_funds(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: u32,
        total: f64,
    ) -> Result<(), GatewayError> {
        let product = self.product(product_id)?;
        if product.stock < quantity {
            return Err(GatewayError::InsufficientStock {
                product_id,
                requested: quantity,
                available: product.stock,
            });
        }
        let customer = self.customer(customer_id)?;
        if customer.budget < total {
            return Err(GatewayError::InsufficientBudget {
                customer_id,
                required: total,
                available: customer.budget,
            });
        }
        Ok(())
    }
}

fn next_id(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

/// Thread-safe in-memory store. Every call is its own unit of work.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a customer and return its identifier.
    pub fn add_customer(
        &self,
        name: impl Into<String>,
        budget: f64,
        tier: Tier,
        total_spent: f64,
    ) -> CustomerId {
        let mut state = self.state.lock();
        let id = next_id(&mut state.next_customer_id);
        state.customers.insert(
            id,
            CustomerRecord {
                id,
                name: name.into(),
                tier,
                budget,
                total_spent,
            },
        );
        id
    }

    /// Insert a product without validation and return its identifier.
    pub fn insert_product(
        &self,
        name: impl Into<String>,
        stock: u32,
        price: f64,
        category: impl Into<String>,
    ) -> ProductId {
        let mut state = self.state.lock();
        let id = next_id(&mut state.next_product_id);
        state.products.insert(
            id,
            ProductRecord {
                id,
                name: name.into(),
                stock,
                price,
                category: category.into(),
            },
        );
        id
    }

    /// Look up a product.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown product.
    pub fn product(&self, id: ProductId) -> Result<ProductRecord, GatewayError> {
        self.state.lock().product(id).cloned()
    }

    /// Look up a product by exact name.
    #[must_use]
    pub fn product_by_name(&self, name: &str) -> Option<ProductRecord> {
        self.state
            .lock()
            .products
            .values()
            .find(|p| p.name == name)
            .cloned()
    }

    /// Look up an order.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<OrderRecord> {
        self.state.lock().orders.get(&id).cloned()
    }

    /// Number of stored orders in any status.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.state.lock().orders.len()
    }

    /// Top the customer table up with random customers when it holds fewer than five.
    ///
    /// Adds 5 to 10 Standard customers with budgets between 500 and 3000, then turns two
    /// of the new customers Premium with a lifetime spend between 2000 and 5000. Returns
    /// the identifiers that were added (empty if the table was already populated).
    pub fn seed_customers<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<CustomerId> {
        if self.state.lock().customers.len() >= 5 {
            return Vec::new();
        }

        let count = rng.random_range(5..=10u8);
        let added: Vec<CustomerId> = (0..count)
            .map(|i| {
                let budget = f64::from(rng.random_range(500..=3_000u32));
                let name = format!("Customer {}", char::from(b'A' + i));
                self.add_customer(name, budget, Tier::Standard, 0.0)
            })
            .collect();

        let premium: Vec<CustomerId> = added.choose_multiple(rng, 2).copied().collect();
        let mut state = self.state.lock();
        for id in premium {
            let spent = f64::from(rng.random_range(2_000..=5_000u32));
            if let Some(customer) = state.customers.get_mut(&id) {
                customer.tier = Tier::Premium;
                customer.total_spent = spent;
            }
        }
        added
    }
}

impl CompletionGateway for InMemoryStore {
    fn create_order(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<OrderId, GatewayError> {
        let mut state = self.state.lock();
        state.customer(customer_id)?;
        let total = state.product(product_id)?.price * f64::from(quantity);
        state.check_funds(customer_id, product_id, quantity, total)?;

        let id = next_id(&mut state.next_order_id);
        state.orders.insert(
            id,
            OrderRecord {
                id,
                customer_id,
                product_id,
                quantity,
                total_price: total,
                status: OrderStatus::Pending,
            },
        );
        Ok(id)
    }

    fn complete_order(&self, order_id: OrderId) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        let order = state
            .orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("order {order_id}")))?;
        if order.status == OrderStatus::Completed {
            return Err(GatewayError::DataStore(format!(
                "order {order_id} is already completed"
            )));
        }
        // stock or budget may have moved since the order was created
        state.check_funds(
            order.customer_id,
            order.product_id,
            order.quantity,
            order.total_price,
        )?;

        if let Some(product) = state.products.get_mut(&order.product_id) {
            product.stock -= order.quantity;
        }
        if let Some(customer) = state.customers.get_mut(&order.customer_id) {
            customer.budget -= order.total_price;
            customer.total_spent += order.total_price;
        }
        if let Some(stored) = state.orders.get_mut(&order_id) {
            stored.status = OrderStatus::Completed;
        }
        Ok(())
    }

    fn fetch_customer(&self, customer_id: CustomerId) -> Result<CustomerRecord, GatewayError> {
        self.state.lock().customer(customer_id).cloned()
    }

    fn promote_tier(&self, customer_id: CustomerId, tier: Tier) -> Result<(), GatewayError> {
        self.set_tier(customer_id, tier)
    }
}

impl AdminGateway for InMemoryStore {
    fn add_product(&self, product: &ProductDraft) -> Result<ProductId, GatewayError> {
        Ok(self.insert_product(
            product.name.clone(),
            product.stock,
            product.price,
            product.category.clone(),
        ))
    }

    fn update_stock(&self, product_id: ProductId, stock: u32) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        let product = state
            .products
            .get_mut(&product_id)
            .ok_or_else(|| GatewayError::NotFound(format!("product {product_id}")))?;
        product.stock = stock;
        Ok(())
    }

    fn delete_product(&self, product_id: ProductId) -> Result<String, GatewayError> {
        let mut state = self.state.lock();
        state.product(product_id)?;
        if state.orders.values().any(|o| o.product_id == product_id) {
            return Err(GatewayError::DataStore(format!(
                "product {product_id} is referenced by existing orders"
            )));
        }
        let removed = state
            .products
            .remove(&product_id)
            .ok_or_else(|| GatewayError::NotFound(format!("product {product_id}")))?;
        Ok(removed.name)
    }

    fn set_tier(&self, customer_id: CustomerId, tier: Tier) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        let customer = state
            .customers
            .get_mut(&customer_id)
            .ok_or_else(|| GatewayError::NotFound(format!("customer {customer_id}")))?;
        customer.tier = tier;
        Ok(())
    }
}

impl Catalog for InMemoryStore {
    fn list_customers(&self) -> Result<Vec<CustomerRecord>, GatewayError> {
        Ok(self.state.lock().customers.values().cloned().collect())
    }

    fn list_products(&self) -> Result<Vec<ProductRecord>, GatewayError> {
        Ok(self.state.lock().products.values().cloned().collect())
    }
}
