//! # Cart Aggregation
//!
//! Produces the figures shown in cart and checkout summaries.
//!
//! ## Two Sources of Truth
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Aggregator                                   │
//! │                                                                         │
//! │  Signed in?                                                             │
//! │     │                                                                   │
//! │     ├── yes ──► backend Cart ──► CartView { source: Backend }           │
//! │     │           summary copied verbatim, no arithmetic here             │
//! │     │                                                                   │
//! │     └── no  ──► GuestCart ─────► CartView { source: Guest }             │
//! │                 subtotal = Σ unit_price × qty                           │
//! │                 fee      = FeeSchedule                                  │
//! │                 e-points discount = 0, always                           │
//! │                                                                         │
//! │  Every mutation hands back a fresh CartView. Callers never keep a       │
//! │  summary computed before the mutation.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Points};
use crate::pricing::effective_price;
use crate::types::{Cart, CartItem, CartSummary, Product, PurchaseType};
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Default flat platform fee in minor units (₹20.00).
pub const DEFAULT_PLATFORM_FEE_MINOR: i64 = 2000;

// =============================================================================
// Fees
// =============================================================================

/// Platform fee rules for locally computed (guest) summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Flat fee charged on a non-empty cart.
    pub platform_fee: Money,
    /// Subtotal at or above which the fee is waived.
    pub free_above: Option<Money>,
}

impl FeeSchedule {
    /// Fee owed on a given subtotal.
    pub fn fee_for(&self, subtotal: Money) -> Money {
        if !subtotal.is_positive() {
            return Money::zero();
        }
        match self.free_above {
            Some(threshold) if subtotal >= threshold => Money::zero(),
            _ => self.platform_fee,
        }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        FeeSchedule {
            platform_fee: Money::from_minor(DEFAULT_PLATFORM_FEE_MINOR),
            free_above: None,
        }
    }
}

// =============================================================================
// Guest Cart
// =============================================================================

/// A line in the guest cart. Price is frozen at the time of adding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCartItem {
    pub product_id: String,
    pub name: String,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    /// Effective (post-discount) unit price.
    pub unit_price: Money,
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

impl GuestCartItem {
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        GuestCartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            image_url: product.image_url.clone(),
            unit_price: effective_price(product),
            quantity,
            added_at: Utc::now(),
        }
    }

    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Guest lines never redeem points.
    pub fn to_cart_item(&self) -> CartItem {
        CartItem {
            product_id: self.product_id.clone(),
            product_name: self.name.clone(),
            brand: self.brand.clone(),
            image_url: self.image_url.clone(),
            quantity: self.quantity,
            purchase_type: PurchaseType::Normal,
            points_used: Points::zero(),
            price: self.line_total(),
        }
    }
}

/// Cart kept on this machine for anonymous sessions.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding again increases quantity)
/// - 1 ≤ quantity ≤ `MAX_ITEM_QUANTITY`; updating to 0 removes the line
/// - At most `MAX_CART_ITEMS` lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestCart {
    pub items: Vec<GuestCartItem>,
}

impl GuestCart {
    pub fn new() -> Self {
        GuestCart { items: Vec::new() }
    }

    pub fn from_items(items: Vec<GuestCartItem>) -> Self {
        GuestCart { items }
    }

    /// Adds a product or increases the quantity of its existing line.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS });
        }

        self.items.push(GuestCartItem::from_product(product, quantity));
        Ok(())
    }

    /// Sets the quantity of a line. Zero removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }
        validate_quantity(quantity)?;

        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ItemNotInCart(product_id.to_string())),
        }
    }

    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(CoreError::ItemNotInCart(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(GuestCartItem::line_total).sum()
    }

    /// Local summary. The e-points discount is always zero.
    pub fn summary(&self, fees: &FeeSchedule) -> CartSummary {
        let subtotal = self.subtotal();
        let platform_fee = fees.fee_for(subtotal);

        CartSummary {
            mrp_total: subtotal,
            e_points_discount: Money::zero(),
            coupon_discount: Money::zero(),
            platform_fee,
            total_payable: subtotal + platform_fee,
            points_used: Points::zero(),
            points_earned: Points::zero(),
            points_available: Points::zero(),
        }
    }
}

// =============================================================================
// Aggregator
// =============================================================================

/// Which path produced a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    Backend,
    Guest,
}

/// What the cart and checkout screens render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub summary: CartSummary,
    pub source: SummarySource,
}

impl CartView {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Builds `CartView`s from either source.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartAggregator {
    fees: FeeSchedule,
}

impl CartAggregator {
    pub fn new(fees: FeeSchedule) -> Self {
        CartAggregator { fees }
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    /// Authenticated path: the backend summary is taken as-is.
    pub fn from_backend(&self, cart: Cart) -> CartView {
        CartView {
            items: cart.items,
            summary: cart.summary,
            source: SummarySource::Backend,
        }
    }

    /// Guest path: computed locally.
    pub fn from_guest(&self, cart: &GuestCart) -> CartView {
        CartView {
            items: cart.items.iter().map(GuestCartItem::to_cart_item).collect(),
            summary: cart.summary(&self.fees),
            source: SummarySource::Guest,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price_major: i64, discount: Option<f64>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            brand: None,
            normal_price: Money::from_major(price_major),
            discount_percent: discount,
            image_url: None,
            category: None,
            description: None,
            in_stock: true,
        }
    }

    #[test]
    fn test_add_identical_items_totals_n_times_unit_price() {
        let mut cart = GuestCart::new();
        let p = product("1", 250, None);

        for _ in 0..4 {
            cart.add_item(&p, 1).unwrap();
        }

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_quantity(), 4);
        assert_eq!(cart.subtotal(), Money::from_major(1000));
    }

    #[test]
    fn test_guest_price_uses_discount() {
        let mut cart = GuestCart::new();
        cart.add_item(&product("1", 500, Some(10.0)), 2).unwrap();

        assert_eq!(cart.subtotal(), Money::from_major(900));
    }

    #[test]
    fn test_guest_summary_never_has_points_discount() {
        let mut cart = GuestCart::new();
        cart.add_item(&product("1", 1000, None), 1).unwrap();
        cart.add_item(&product("2", 40, Some(5.0)), 3).unwrap();

        let summary = cart.summary(&FeeSchedule::default());

        assert_eq!(summary.e_points_discount, Money::zero());
        assert_eq!(summary.points_used, Points::zero());
        assert_eq!(summary.mrp_total, Money::from_major(1114));
        assert_eq!(summary.platform_fee, Money::from_major(20));
        assert_eq!(summary.total_payable, Money::from_major(1134));
    }

    #[test]
    fn test_empty_cart_has_no_fee() {
        let summary = GuestCart::new().summary(&FeeSchedule::default());
        assert_eq!(summary.total_payable, Money::zero());
    }

    #[test]
    fn test_fee_waived_above_threshold() {
        let fees = FeeSchedule {
            platform_fee: Money::from_major(20),
            free_above: Some(Money::from_major(500)),
        };
        assert_eq!(fees.fee_for(Money::from_major(499)), Money::from_major(20));
        assert_eq!(fees.fee_for(Money::from_major(500)), Money::zero());
    }

    #[test]
    fn test_update_and_remove() {
        let mut cart = GuestCart::new();
        cart.add_item(&product("1", 100, None), 1).unwrap();
        cart.add_item(&product("2", 100, None), 1).unwrap();

        cart.update_quantity("1", 5).unwrap();
        assert_eq!(cart.total_quantity(), 6);

        cart.update_quantity("2", 0).unwrap();
        assert_eq!(cart.items.len(), 1);

        assert!(matches!(
            cart.remove_item("missing"),
            Err(CoreError::ItemNotInCart(_))
        ));
        assert!(cart.update_quantity("1", -2).is_err());
    }

    #[test]
    fn test_quantity_cap() {
        let mut cart = GuestCart::new();
        let p = product("1", 10, None);
        cart.add_item(&p, MAX_ITEM_QUANTITY).unwrap();

        let err = cart.add_item(&p, 1).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));
    }

    #[test]
    fn test_line_cap() {
        let mut cart = GuestCart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(&product(&i.to_string(), 1, None), 1).unwrap();
        }
        let err = cart.add_item(&product("overflow", 1, None), 1).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));
    }

    #[test]
    fn test_aggregator_backend_is_verbatim() {
        let backend = Cart {
            items: vec![],
            summary: CartSummary {
                mrp_total: Money::from_major(1000),
                e_points_discount: Money::from_major(370),
                platform_fee: Money::from_major(15),
                total_payable: Money::from_major(645),
                points_used: Points::new(370),
                ..CartSummary::default()
            },
        };

        let view = CartAggregator::default().from_backend(backend.clone());
        assert_eq!(view.summary, backend.summary);
        assert_eq!(view.source, SummarySource::Backend);
    }

    #[test]
    fn test_aggregator_guest_lines_are_normal() {
        let mut cart = GuestCart::new();
        cart.add_item(&product("1", 300, None), 2).unwrap();

        let view = CartAggregator::default().from_guest(&cart);
        assert_eq!(view.source, SummarySource::Guest);
        assert_eq!(view.items[0].purchase_type, PurchaseType::Normal);
        assert_eq!(view.items[0].price, Money::from_major(600));
        assert_eq!(view.total_quantity(), 2);
    }
}
