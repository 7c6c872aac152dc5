//! # Cart Commands
//!
//! ## Two Carts
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         valid bearer token?                             │
//! │                    ┌──────────┴──────────┐                              │
//! │                   yes                    no                             │
//! │                    │                     │                              │
//! │   POST/PUT/DELETE /api/cart/...      GuestCart (SQLite mirror)          │
//! │   then GET /api/cart                 add_item / update_quantity / ...   │
//! │                    │                     │                              │
//! │   CartAggregator::from_backend      CartAggregator::from_guest          │
//! │   (summary copied verbatim)         (subtotal + fee, 0 EP discount)     │
//! │                    └──────────┬──────────┘                              │
//! │                           CartView                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command returns the cart as it is after the change.
//! Signing in does not merge the guest cart; it stays local until
//! `cart clear`.

use storefront_api::{AddToCartRequest, UpdateCartItemRequest};
use storefront_core::validation::validate_quantity;
use storefront_core::{CartView, CoreError, PurchaseType};
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::state::AppState;

pub async fn show(state: &AppState) -> AppResult<CartView> {
    debug!("cart show command");
    let aggregator = state.config.aggregator();

    if state.api.is_authenticated().await? {
        let cart = state.api.cart().await?;
        return Ok(aggregator.from_backend(cart));
    }

    let guest = state.cart.snapshot().await;
    Ok(aggregator.from_guest(&guest))
}

/// Adds `quantity` of a product.
///
/// Signed in, the purchase type is resolved against the current e-points
/// balance before the request is sent. As a guest it is always NORMAL.
pub async fn add(
    state: &AppState,
    product_id: &str,
    quantity: i64,
    requested: PurchaseType,
) -> AppResult<CartView> {
    debug!(product_id = %product_id, quantity, purchase_type = %requested, "cart add command");
    let aggregator = state.config.aggregator();
    let product = state.api.product(product_id).await?;

    if state.api.is_authenticated().await? {
        let user = state.session.refresh_user(&state.api).await?;
        let request = AddToCartRequest::for_product(&product, Some(&user), quantity, requested)?;
        if request.purchase_type != requested {
            info!(
                requested = %requested,
                applied = %request.purchase_type,
                "Purchase type adjusted"
            );
        }

        let cart = state.api.add_to_cart(&request).await?;
        return Ok(aggregator.from_backend(cart));
    }

    if requested.uses_points() {
        warn!(requested = %requested, "e-points need a signed-in card holder, adding as NORMAL");
    }
    if !product.in_stock {
        return Err(CoreError::OutOfStock(product.id).into());
    }

    state
        .cart
        .with_cart_mut(|cart| cart.add_item(&product, quantity))
        .await?;
    Ok(aggregator.from_guest(&state.cart.snapshot().await))
}

/// Sets a line's quantity. Zero removes the line.
pub async fn update(state: &AppState, product_id: &str, quantity: i64) -> AppResult<CartView> {
    debug!(product_id = %product_id, quantity, "cart update command");

    if quantity == 0 {
        return remove(state, product_id).await;
    }
    validate_quantity(quantity)?;

    let aggregator = state.config.aggregator();
    if state.api.is_authenticated().await? {
        let request = UpdateCartItemRequest {
            quantity,
            purchase_type: None,
        };
        let cart = state.api.update_cart_item(product_id, &request).await?;
        return Ok(aggregator.from_backend(cart));
    }

    state
        .cart
        .with_cart_mut(|cart| cart.update_quantity(product_id, quantity))
        .await?;
    Ok(aggregator.from_guest(&state.cart.snapshot().await))
}

pub async fn remove(state: &AppState, product_id: &str) -> AppResult<CartView> {
    debug!(product_id = %product_id, "cart remove command");
    let aggregator = state.config.aggregator();

    if state.api.is_authenticated().await? {
        let cart = state.api.remove_cart_item(product_id).await?;
        return Ok(aggregator.from_backend(cart));
    }

    state
        .cart
        .with_cart_mut(|cart| cart.remove_item(product_id))
        .await?;
    Ok(aggregator.from_guest(&state.cart.snapshot().await))
}

/// Empties the backend cart when signed in, and the local guest cart always.
pub async fn clear(state: &AppState) -> AppResult<CartView> {
    debug!("cart clear command");

    state
        .cart
        .with_cart_mut(|cart| -> Result<(), CoreError> {
            cart.clear();
            Ok(())
        })
        .await?;

    if state.api.is_authenticated().await? {
        state.api.clear_cart().await?;
        let cart = state.api.cart().await?;
        info!("Cart cleared");
        return Ok(state.config.aggregator().from_backend(cart));
    }

    info!("Guest cart cleared");
    Ok(state.config.aggregator().from_guest(&state.cart.snapshot().await))
}
