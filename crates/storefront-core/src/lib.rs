//! # storefront-core: Pure Business Logic for the Storefront
//!
//! This crate holds the storefront's business rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/storefront (CLI)                          │   │
//! │  │    products ──► product <id> ──► cart ──► checkout              │   │
//! │  └───────────────┬─────────────────────────────┬───────────────────┘   │
//! │                  │                             │                        │
//! │  ┌───────────────▼───────────────┐  ┌──────────▼──────────────────┐    │
//! │  │  storefront-api (REST)        │  │  storefront-db (SQLite)     │    │
//! │  └───────────────┬───────────────┘  └──────────┬──────────────────┘    │
//! │                  │                             │                        │
//! │  ┌───────────────▼─────────────────────────────▼───────────────────┐   │
//! │  │               ★ storefront-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │ pricing │ │  cart   │ │validat. │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, User, Cart, Order, ...)
//! - [`money`] - Money and Points with integer arithmetic
//! - [`pricing`] - e-Points redemption calculator
//! - [`cart`] - Guest cart and the cart aggregator
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::money::{Money, Points};
//! use storefront_core::pricing::redemption_options;
//!
//! let options = redemption_options(Money::from_major(1000));
//! assert_eq!(options.partial.points, Points::new(370));
//! assert_eq!(options.partial.cash, Money::from_major(630));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartAggregator, CartView, FeeSchedule, GuestCart, GuestCartItem, SummarySource};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{DiscountRate, Money, Points};
pub use pricing::{RedemptionOptions, RedemptionQuote};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a guest cart.
pub const MAX_CART_ITEMS: usize = 50;

/// Maximum quantity of a single product per order.
pub const MAX_ITEM_QUANTITY: i64 = 10;
