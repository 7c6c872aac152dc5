//! # Cart State
//!
//! The guest cart, kept in memory and mirrored to SQLite.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>`: one mutation at a time, and the
//! in-memory copy only changes once the new cart has been written.
//!
//! ```text
//! with_cart_mut(f)
//!      │
//!      ├── lock
//!      ├── clone → f(&mut next) ── Err ──► unchanged
//!      ├── repo.save(&next)     ── Err ──► unchanged
//!      └── *cart = next
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{AppError, AppResult};
use storefront_core::GuestCart;
use storefront_db::GuestCartRepository;

#[derive(Debug, Clone)]
pub struct CartState {
    cart: Arc<Mutex<GuestCart>>,
    repo: GuestCartRepository,
}

impl CartState {
    /// Loads whatever the last invocation left behind.
    pub async fn load(repo: GuestCartRepository) -> AppResult<Self> {
        let cart = repo.load().await?;
        debug!(lines = cart.items.len(), "Guest cart loaded");

        Ok(CartState {
            cart: Arc::new(Mutex::new(cart)),
            repo,
        })
    }

    /// Executes a function with read access to the cart.
    pub async fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&GuestCart) -> R,
    {
        let cart = self.cart.lock().await;
        f(&cart)
    }

    /// Executes a fallible change and persists the result.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.add_item(&product, 1)).await?;
    /// ```
    pub async fn with_cart_mut<F, R, E>(&self, f: F) -> AppResult<R>
    where
        F: FnOnce(&mut GuestCart) -> Result<R, E>,
        E: Into<AppError>,
    {
        let mut cart = self.cart.lock().await;

        let mut next = cart.clone();
        let result = f(&mut next).map_err(Into::<AppError>::into)?;

        self.repo.save(&next).await?;
        *cart = next;
        Ok(result)
    }

    /// Snapshot of the current cart.
    pub async fn snapshot(&self) -> GuestCart {
        self.with_cart(|cart| cart.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use storefront_core::{CoreError, Money, Product};
    use storefront_db::{Database, DbConfig};

    fn product(id: &str, rupees: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            brand: None,
            normal_price: Money::from_major(rupees),
            discount_percent: None,
            image_url: None,
            category: None,
            description: None,
            in_stock: true,
        }
    }

    #[tokio::test]
    async fn test_mutation_is_persisted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = CartState::load(db.guest_cart()).await.unwrap();

        state
            .with_cart_mut(|cart| cart.add_item(&product("p-1", 100), 2))
            .await
            .unwrap();

        let reloaded = CartState::load(db.guest_cart()).await.unwrap();
        assert_eq!(reloaded.snapshot().await.total_quantity(), 2);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_cart_unchanged() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = CartState::load(db.guest_cart()).await.unwrap();

        state
            .with_cart_mut(|cart| cart.add_item(&product("p-1", 100), 9))
            .await
            .unwrap();

        let err = state
            .with_cart_mut(|cart| -> Result<(), CoreError> {
                cart.clear();
                cart.add_item(&product("p-2", 50), 11)
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(state.snapshot().await.total_quantity(), 9);
        assert_eq!(db.guest_cart().load().await.unwrap().total_quantity(), 9);
    }
}
