//! # storefront-api: Backend REST Client
//!
//! Typed access to the storefront backend. Signed-in carts, orders and
//! every figure in their summaries come from here; nothing in this crate
//! recomputes them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apps/storefront (CLI)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                storefront-api (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   client.rs      ApiClient: base URL, timeout, bearer header    │   │
//! │  │   token.rs       TokenStore trait, JWT expiry                   │   │
//! │  │   endpoints/     auth, catalog, cart, orders, account, admin    │   │
//! │  │   payment.rs     PaymentGateway, CheckoutGuard, CheckoutFlow    │   │
//! │  │   error.rs       ApiError, backend error body parsing           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Backend: /api/auth, /api/products, /api/cart, /api/orders, ...         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use storefront_api::{ApiClient, ApiConfig, MemoryTokenStore};
//!
//! let client = ApiClient::new(
//!     ApiConfig::new("http://localhost:8080"),
//!     Arc::new(MemoryTokenStore::new()),
//! )?;
//! let user = client.login("asha@example.in", "secret1").await?;
//! let cart = client.cart().await?;
//! ```

pub mod client;
pub mod endpoints;
pub mod error;
pub mod payment;
pub mod token;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use client::{ApiClient, ApiConfig};
pub use endpoints::account::AddressError;
pub use endpoints::admin::{HealthStatus, Metrics};
pub use endpoints::auth::RegisterRequest;
pub use endpoints::cart::{AddToCartRequest, UpdateCartItemRequest};
pub use endpoints::catalog::ProductQuery;
pub use endpoints::orders::{
    new_idempotency_key, PaymentVerification, PlaceOrderRequest, PlacedOrder,
};
pub use error::{ApiError, ApiResult};
pub use payment::{
    CheckoutFlow, CheckoutGuard, CheckoutOutcome, PaymentGateway, PaymentOutcome, PaymentRequest,
};
pub use token::{MemoryTokenStore, TokenStore};
