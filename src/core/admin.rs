//! Administrative product and customer mutations.
//!
//! Every mutation runs under the scheduler's [`Coordinator`], so it can never interleave
//! with an order being completed against the same stock or budget.

use serde::{Deserialize, Serialize};

use crate::core::coordinator::Coordinator;
use crate::core::error::{AdminError, GatewayError};
use crate::core::events::{EventBus, LogLevel};
use crate::core::request::{CustomerId, ProductId, Tier};

/// Input for creating a product. Numeric fields are validated before reaching the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Display name, must not be blank.
    pub name: String,
    /// Initial stock, must be non-negative.
    pub stock: i64,
    /// Unit price, must be finite and non-negative.
    pub price: f64,
    /// Category, must not be blank.
    pub category: String,
}

/// Validated product fields handed to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    /// Trimmed display name.
    pub name: String,
    /// Initial stock.
    pub stock: u32,
    /// Unit price.
    pub price: f64,
    /// Trimmed category.
    pub category: String,
}

impl NewProduct {
    /// Check the input and produce a draft the store can insert.
    ///
    /// # Errors
    ///
    /// Returns the first [`AdminError`] validation failure.
    pub fn validate(&self) -> Result<ProductDraft, AdminError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AdminError::EmptyName);
        }
        let stock = validate_stock(self.stock)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AdminError::InvalidPrice(self.price));
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(AdminError::MissingCategory);
        }
        Ok(ProductDraft {
            name: name.to_owned(),
            stock,
            price: self.price,
            category: category.to_owned(),
        })
    }
}

fn validate_stock(stock: i64) -> Result<u32, AdminError> {
    u32::try_from(stock).map_err(|_| AdminError::InvalidStock(stock))
}

/// Store operations behind administrative mutations.
pub trait AdminGateway: Send + Sync + 'static {
    /// Insert a product and return its identifier.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] raised by the store.
    fn add_product(&self, product: &ProductDraft) -> Result<ProductId, GatewayError>;

    /// Overwrite a product's stock level.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown product, or any other store failure.
    fn update_stock(&self, product_id: ProductId, stock: u32) -> Result<(), GatewayError>;

    /// Delete a product and return its name.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown product; `DataStore` if orders still reference it.
    fn delete_product(&self, product_id: ProductId) -> Result<String, GatewayError>;

    /// Set a customer's tier by hand.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown customer, or any other store failure.
    fn set_tier(&self, customer_id: CustomerId, tier: Tier) -> Result<(), GatewayError>;
}

impl<A: AdminGateway + ?Sized> AdminGateway for std::sync::Arc<A> {
    fn add_product(&self, product: &ProductDraft) -> Result<ProductId, GatewayError> {
        (**self).add_product(product)
    }

    fn update_stock(&self, product_id: ProductId, stock: u32) -> Result<(), GatewayError> {
        (**self).update_stock(product_id, stock)
    }

    fn delete_product(&self, product_id: ProductId) -> Result<String, GatewayError> {
        (**self).delete_product(product_id)
    }

    fn set_tier(&self, customer_id: CustomerId, tier: Tier) -> Result<(), GatewayError> {
        (**self).set_tier(customer_id, tier)
    }
}

/// Coordinator-guarded entry point for administrative writes.
#[derive(Debug)]
pub struct AdminConsole<A> {
    gateway: A,
    coordinator: Coordinator,
    events: EventBus,
}

impl<A: AdminGateway> AdminConsole<A> {
    /// Create a console sharing the scheduler's coordinator and event bus.
    #[must_use]
    pub const fn new(gateway: A, coordinator: Coordinator, events: EventBus) -> Self {
        Self {
            gateway,
            coordinator,
            events,
        }
    }

    /// Validate and insert a product.
    ///
    /// # Errors
    ///
    /// Validation failures or the store's error.
    pub fn add_product(&self, product: &NewProduct) -> Result<ProductId, AdminError> {
        let draft = product.validate()?;
        let id = self.coordinator.run(|| self.gateway.add_product(&draft))?;
        self.events.log(
            LogLevel::Info,
            format!(
                "Admin: product added -> {} (stock: {}, price: {}, category: {})",
                draft.name, draft.stock, draft.price, draft.category
            ),
        );
        Ok(id)
    }

    /// Set a product's stock level.
    ///
    /// # Errors
    ///
    /// [`AdminError::InvalidStock`] for negative values, or the store's error.
    pub fn update_stock(&self, product_id: ProductId, stock: i64) -> Result<(), AdminError> {
        let stock = validate_stock(stock)?;
        self.coordinator
            .run(|| self.gateway.update_stock(product_id, stock))?;
        self.events.log(
            LogLevel::Info,
            format!("Admin: stock updated -> product {product_id} = {stock}"),
        );
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// The store's error, e.g. while orders still reference the product.
    pub fn delete_product(&self, product_id: ProductId) -> Result<(), AdminError> {
        let name = self
            .coordinator
            .run(|| self.gateway.delete_product(product_id))?;
        self.events
            .log(LogLevel::Info, format!("Admin: product deleted -> {name}"));
        Ok(())
    }

    /// Manually change a customer's tier.
    ///
    /// # Errors
    ///
    /// The store's error.
    pub fn set_tier(&self, customer_id: CustomerId, tier: Tier) -> Result<(), AdminError> {
        self.coordinator
            .run(|| self.gateway.set_tier(customer_id, tier))?;
        self.events.log(
            LogLevel::Info,
            format!("Admin: customer {customer_id} tier set to {tier}"),
        );
        Ok(())
    }

    /// Run several mutations under a single coordinator acquisition.
    ///
    /// The individual operations re-acquire the (reentrant) lock, which is what lets them
    /// nest inside `f` without deadlocking.
    pub fn batch<T>(&self, f: impl FnOnce(&Self) -> T) -> T {
        self.coordinator.run(|| f(self))
    }

    /// The underlying store.
    #[must_use]
    pub const fn gateway(&self) -> &A {
        &self.gateway
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, stock: i64, price: f64, category: &str) -> NewProduct {
        NewProduct {
            name: name.into(),
            stock,
            price,
            category: category.into(),
        }
    }

    #[test]
    fn test_validate_accepts_and_trims() {
        let draft = product("  Boots ", 5, 79.5, " Shoes ").validate().unwrap();
        assert_eq!(draft.name, "Boots");
        assert_eq!(draft.category, "Shoes");
        assert_eq!(draft.stock, 5);
    }

    #[test]
    fn test_validate_rejections() {
        assert_eq!(
            product(" ", 1, 1.0, "Bags").validate(),
            Err(AdminError::EmptyName)
        );
        assert_eq!(
            product("Tote", -1, 1.0, "Bags").validate(),
            Err(AdminError::InvalidStock(-1))
        );
        assert_eq!(
            product("Tote", 1, -0.5, "Bags").validate(),
            Err(AdminError::InvalidPrice(-0.5))
        );
        assert_eq!(
            product("Tote", 1, 1.0, "").validate(),
            Err(AdminError::MissingCategory)
        );
    }
}
