//! # Catalog Commands
//!
//! Browsing needs no sign-in. Product details carry the redemption
//! options only when the viewer may use them.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Basmati Rice 5kg                            ₹1000.00        │
//! │                                                              │
//! │  NORMAL       ₹1000.00                                       │
//! │  PARTIAL_EP   ₹630.00 + 370 EP                               │
//! │  FULL_EP      ₹0.00 + 1000 EP        (card holders only,     │
//! │                                       undiscounted products) │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use storefront_api::ProductQuery;
use storefront_core::pricing::{effective_price, options_for, points_earned};
use storefront_core::{Category, Money, Page, Points, Product, RedemptionOptions};
use tracing::debug;

use crate::error::AppResult;
use crate::state::AppState;

/// What `storefront product <id>` shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub product: Product,
    /// Price after any product discount.
    pub price: Money,
    /// Hidden for discounted products, guests and non-card-holders.
    pub options: Option<RedemptionOptions>,
    /// Estimate for a cash purchase; the backend has the final word.
    pub points_earned: Points,
}

pub async fn products(state: &AppState, query: &ProductQuery) -> AppResult<Page<Product>> {
    debug!(page = query.page, q = ?query.q, category = ?query.category, "products command");
    Ok(state.api.products(query).await?)
}

pub async fn product(state: &AppState, id: &str) -> AppResult<ProductDetails> {
    debug!(id = %id, "product command");

    let product = state.api.product(id).await?;
    let user = state.session.current_user(&state.api).await?;

    let price = effective_price(&product);
    Ok(ProductDetails {
        options: options_for(&product, user.as_ref()),
        points_earned: points_earned(price),
        price,
        product,
    })
}

pub async fn categories(state: &AppState) -> AppResult<Vec<Category>> {
    debug!("categories command");
    Ok(state.api.categories().await?)
}
