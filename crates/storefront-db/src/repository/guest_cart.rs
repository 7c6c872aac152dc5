//! # Guest Cart Repository
//!
//! Stores the anonymous cart so it survives between commands.
//!
//! ```text
//! storefront cart add 42 --qty 2
//!      │
//!      ├── repo.load()          rows → GuestCart
//!      ├── cart.add_item(..)    rules live in storefront-core
//!      └── repo.save(&cart)     DELETE + INSERT in one transaction
//! ```
//!
//! Prices are stored in minor units, never as REAL.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::{GuestCart, GuestCartItem, Money};

#[derive(sqlx::FromRow)]
struct GuestCartRow {
    product_id: String,
    name: String,
    brand: Option<String>,
    image_url: Option<String>,
    unit_price_minor: i64,
    quantity: i64,
    added_at: String,
}

impl TryFrom<GuestCartRow> for GuestCartItem {
    type Error = DbError;

    fn try_from(row: GuestCartRow) -> Result<Self, Self::Error> {
        let added_at = DateTime::parse_from_rfc3339(&row.added_at)
            .map_err(|e| DbError::Corrupt(format!("guest_cart_items.added_at: {}", e)))?
            .with_timezone(&Utc);

        Ok(GuestCartItem {
            product_id: row.product_id,
            name: row.name,
            brand: row.brand,
            image_url: row.image_url,
            unit_price: Money::from_minor(row.unit_price_minor),
            quantity: row.quantity,
            added_at,
        })
    }
}

/// Repository for guest cart lines.
#[derive(Debug, Clone)]
pub struct GuestCartRepository {
    pool: SqlitePool,
}

impl GuestCartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        GuestCartRepository { pool }
    }

    /// Loads the cart in the order lines were added.
    pub async fn load(&self) -> DbResult<GuestCart> {
        let rows: Vec<GuestCartRow> = sqlx::query_as(
            r#"
            SELECT product_id, name, brand, image_url, unit_price_minor, quantity, added_at
            FROM guest_cart_items
            ORDER BY added_at, product_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(GuestCartItem::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        debug!(lines = items.len(), "Guest cart loaded");
        Ok(GuestCart::from_items(items))
    }

    /// Replaces the stored cart with `cart`.
    pub async fn save(&self, cart: &GuestCart) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM guest_cart_items")
            .execute(&mut *tx)
            .await?;

        for item in &cart.items {
            sqlx::query(
                r#"
                INSERT INTO guest_cart_items
                    (product_id, name, brand, image_url, unit_price_minor, quantity, added_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(&item.brand)
            .bind(&item.image_url)
            .bind(item.unit_price.minor())
            .bind(item.quantity)
            .bind(item.added_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(lines = cart.items.len(), "Guest cart saved");
        Ok(())
    }

    /// Removes every line.
    pub async fn clear(&self) -> DbResult<()> {
        sqlx::query("DELETE FROM guest_cart_items")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
