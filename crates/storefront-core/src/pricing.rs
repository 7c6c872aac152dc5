//! # Redemption Pricing
//!
//! The single home of e-points redemption math. Product cards, product
//! details, cart and checkout all call into this module; nothing else in
//! the workspace computes points.
//!
//! ## The Three Options
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Normal price P = ₹1000.00                                              │
//! │                                                                         │
//! │  NORMAL       cash ₹1000.00   points    0                               │
//! │  PARTIAL_EP   cash  ₹630.00   points  370   = ceil(P × 0.37)            │
//! │  FULL_EP      cash    ₹0.00   points 1000   = ceil(P)                   │
//! │                                                                         │
//! │  Points are always rounded UP (never undercharge points).               │
//! │  Cash under PARTIAL_EP is P − points, so it takes the floor side.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Who May Redeem
//! ```text
//! product discounted? ──yes──► NORMAL (points = 0), whatever was selected
//!        │ no
//!        ▼
//! user is card holder? ──no──► NORMAL
//!        │ yes
//!        ▼
//! requested type honored
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Points, MINOR_PER_MAJOR};
use crate::types::{Product, PurchaseType, User};

/// Share of the price payable in points under PARTIAL_EP, in basis points.
pub const PARTIAL_REDEMPTION_BPS: i64 = 3700;

/// Cash spent per e-point earned (display estimate only).
pub const EARN_RATE_MAJOR_PER_POINT: i64 = 100;

// =============================================================================
// Quotes
// =============================================================================

/// Cash/points split for one unit under one purchase type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionQuote {
    pub purchase_type: PurchaseType,
    pub cash: Money,
    pub points: Points,
}

impl RedemptionQuote {
    /// The all-cash quote.
    pub const fn normal(price: Money) -> Self {
        RedemptionQuote {
            purchase_type: PurchaseType::Normal,
            cash: price,
            points: Points::zero(),
        }
    }

    /// Scales a unit quote to a line of `qty` units.
    pub fn for_quantity(&self, qty: i64) -> Self {
        RedemptionQuote {
            purchase_type: self.purchase_type,
            cash: self.cash * qty,
            points: self.points * qty,
        }
    }
}

/// All three options for one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionOptions {
    pub normal: RedemptionQuote,
    pub partial: RedemptionQuote,
    pub full: RedemptionQuote,
}

impl RedemptionOptions {
    pub fn get(&self, purchase_type: PurchaseType) -> RedemptionQuote {
        match purchase_type {
            PurchaseType::Normal => self.normal,
            PurchaseType::PartialEp => self.partial,
            PurchaseType::FullEp => self.full,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RedemptionQuote> {
        [&self.normal, &self.partial, &self.full].into_iter()
    }
}

// =============================================================================
// Calculator
// =============================================================================

/// Ceiling division for non-negative numerators.
fn ceil_div(numerator: i128, denominator: i128) -> i128 {
    (numerator + denominator - 1) / denominator
}

/// Points charged for `price` at `share_bps` of the price, rounded up.
fn points_for(price: Money, share_bps: i64) -> Points {
    let price = price.non_negative().minor() as i128;
    let points = ceil_div(price * share_bps as i128, 10_000 * MINOR_PER_MAJOR as i128);
    Points::new(points as i64)
}

/// Partial option points: `ceil(P × 0.37)`.
///
/// ## Example
/// ```rust
/// use storefront_core::money::{Money, Points};
/// use storefront_core::pricing::partial_points;
///
/// assert_eq!(partial_points(Money::from_major(1000)), Points::new(370));
/// assert_eq!(partial_points(Money::from_minor(109_900)), Points::new(407));
/// ```
pub fn partial_points(price: Money) -> Points {
    points_for(price, PARTIAL_REDEMPTION_BPS)
}

/// Full option points: `ceil(P)`.
pub fn full_points(price: Money) -> Points {
    points_for(price, 10_000)
}

/// Quote for one unit at `price` under `purchase_type`.
///
/// Cash never goes below zero; on sub-unit prices the rounded-up points
/// can exceed the price.
pub fn quote(price: Money, purchase_type: PurchaseType) -> RedemptionQuote {
    let points = match purchase_type {
        PurchaseType::Normal => return RedemptionQuote::normal(price),
        PurchaseType::PartialEp => partial_points(price),
        PurchaseType::FullEp => full_points(price),
    };

    RedemptionQuote {
        purchase_type,
        cash: (price - points.value()).non_negative(),
        points,
    }
}

/// Computes the three redemption options for a price.
///
/// ## Example
/// ```rust
/// use storefront_core::money::{Money, Points};
/// use storefront_core::pricing::redemption_options;
///
/// let options = redemption_options(Money::from_major(1000));
/// assert_eq!(options.partial.points, Points::new(370));
/// assert_eq!(options.partial.cash, Money::from_major(630));
/// assert_eq!(options.full.points, Points::new(1000));
/// ```
pub fn redemption_options(price: Money) -> RedemptionOptions {
    RedemptionOptions {
        normal: quote(price, PurchaseType::Normal),
        partial: quote(price, PurchaseType::PartialEp),
        full: quote(price, PurchaseType::FullEp),
    }
}

/// Effective price after any product discount.
///
/// `normalPrice × (1 − discountPercent/100)` when a discount is active,
/// otherwise the normal price.
pub fn effective_price(product: &Product) -> Money {
    if product.has_discount() {
        product.normal_price.apply_discount(product.discount())
    } else {
        product.normal_price
    }
}

/// Whether the redemption options are shown for this product and user.
///
/// `user` is `None` in guest mode.
pub fn offers_redemption(product: &Product, user: Option<&User>) -> bool {
    !product.has_discount() && user.is_some_and(|u| u.card_holder)
}

/// Options to display for a product, or `None` when they are hidden.
pub fn options_for(product: &Product, user: Option<&User>) -> Option<RedemptionOptions> {
    offers_redemption(product, user).then(|| redemption_options(product.normal_price))
}

/// Resolves the purchase type actually applied to one unit.
///
/// Discounted products and non-card-holders always resolve to NORMAL with
/// zero points, regardless of what was requested.
pub fn resolve_purchase(
    product: &Product,
    user: Option<&User>,
    requested: PurchaseType,
) -> RedemptionQuote {
    if !offers_redemption(product, user) {
        return RedemptionQuote::normal(effective_price(product));
    }
    quote(product.normal_price, requested)
}

/// Checks that the user can cover the points of a (line) quote.
pub fn ensure_affordable(quote: &RedemptionQuote, user: &User) -> CoreResult<()> {
    if quote.points > user.e_points {
        return Err(CoreError::InsufficientPoints {
            required: quote.points.get(),
            available: user.e_points.get(),
        });
    }
    Ok(())
}

/// Estimated points earned on a cash payment: one point per 100 currency
/// units, rounded down. Backend summaries take precedence.
pub fn points_earned(cash_paid: Money) -> Points {
    let major = cash_paid.non_negative().minor() / (EARN_RATE_MAJOR_PER_POINT * MINOR_PER_MAJOR);
    Points::new(major)
}

// =============================================================================
// Unit Tests
// =============================================================================
