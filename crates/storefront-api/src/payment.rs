//! # Checkout & Payment
//!
//! Places the order, hands the payable amount to a payment gateway and
//! confirms the result with the backend.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CheckoutFlow::run                                │
//! │                                                                         │
//! │  guard.begin() ── already set ──► ApiError::CheckoutInProgress          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET /api/cart ── empty ──► ApiError::CartEmpty   (skipped on resume)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  POST /api/orders  (Idempotency-Key: one per flow)                      │
//! │       │                                                                 │
//! │       ├── CASH_ON_DELIVERY ──────────────────────► Placed               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  gateway.open(order, amount)                                            │
//! │       ├── Succeeded ─► POST /api/payments/verify ─► Paid                │
//! │       ├── Dismissed ─► guard reset ──────────────► Dismissed            │
//! │       └── Failed ────► guard reset ──────────────► ApiError::Payment    │
//! │                                                                         │
//! │  Any error resets the guard. Success leaves it set: the flow is over.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::endpoints::orders::{new_idempotency_key, PaymentVerification, PlaceOrderRequest};
use crate::error::{ApiError, ApiResult};
use storefront_core::{Cart, Money, Order, PaymentMethod};

// =============================================================================
// Gateway
// =============================================================================

/// What the gateway is asked to collect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub order_id: String,
    pub amount: Money,
    /// Gateway-side order reference issued by the backend.
    pub payment_ref: Option<String>,
}

/// How the customer left the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded { payment_id: String, signature: String },
    /// Closed without paying.
    Dismissed,
    Failed { reason: String },
}

/// A third-party payment widget.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn open(&self, request: &PaymentRequest) -> PaymentOutcome;
}

// =============================================================================
// Guard
// =============================================================================

/// In-flight flag preventing a second submission of the same checkout.
#[derive(Debug, Default)]
pub struct CheckoutGuard {
    in_flight: AtomicBool,
}

impl CheckoutGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a checkout as started.
    pub fn begin(&self) -> ApiResult<()> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(ApiError::CheckoutInProgress);
        }
        Ok(())
    }

    pub fn reset(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

// =============================================================================
// Flow
// =============================================================================

/// How a checkout ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Cash on delivery: placed, nothing to pay now.
    Placed { order: Order, cart: Cart },
    /// Paid online and verified by the backend.
    Paid { order: Order, cart: Cart },
    /// Gateway closed. The order stays pending payment.
    Dismissed { order_id: String },
}

/// One checkout attempt.
///
/// Each flow places its order under one idempotency key. A flow built
/// with [`CheckoutFlow::resume`] reuses the key of an earlier attempt
/// whose response never arrived, so the backend hands back that order
/// rather than placing a second one.
pub struct CheckoutFlow<'a> {
    client: &'a ApiClient,
    gateway: &'a dyn PaymentGateway,
    guard: &'a CheckoutGuard,
    idempotency_key: String,
    resumed: bool,
}

impl<'a> CheckoutFlow<'a> {
    pub fn new(
        client: &'a ApiClient,
        gateway: &'a dyn PaymentGateway,
        guard: &'a CheckoutGuard,
    ) -> Self {
        CheckoutFlow {
            client,
            gateway,
            guard,
            idempotency_key: new_idempotency_key(),
            resumed: false,
        }
    }

    /// Continues an earlier attempt placed under `idempotency_key`.
    ///
    /// The local empty-cart check is skipped: the first attempt may
    /// already have emptied the cart.
    pub fn resume(mut self, idempotency_key: impl Into<String>) -> Self {
        self.idempotency_key = idempotency_key.into();
        self.resumed = true;
        self
    }

    pub fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    pub async fn run(&self, request: &PlaceOrderRequest) -> ApiResult<CheckoutOutcome> {
        self.guard.begin()?;

        let result = self.submit(request).await;
        match &result {
            Ok(CheckoutOutcome::Dismissed { .. }) | Err(_) => self.guard.reset(),
            Ok(_) => {}
        }
        result
    }

    async fn submit(&self, request: &PlaceOrderRequest) -> ApiResult<CheckoutOutcome> {
        let cart = if self.resumed {
            None
        } else {
            let cart = self.client.cart().await?;
            if cart.is_empty() {
                return Err(ApiError::CartEmpty);
            }
            Some(cart)
        };

        let placed = self
            .client
            .place_order(request, &self.idempotency_key)
            .await?;

        if request.payment_method == PaymentMethod::CashOnDelivery {
            let cart = self.client.cart().await?;
            return Ok(CheckoutOutcome::Placed {
                order: placed.order,
                cart,
            });
        }

        // Older backends return the order without its summary.
        let amount = match cart {
            Some(cart) if !placed.order.summary.total_payable.is_positive() => {
                cart.summary.total_payable
            }
            _ => placed.order.summary.total_payable,
        };

        let payment = PaymentRequest {
            order_id: placed.order.id.clone(),
            amount,
            payment_ref: placed.payment_ref.clone(),
        };
        debug!(order_id = %payment.order_id, amount = %payment.amount, "Opening payment gateway");

        match self.gateway.open(&payment).await {
            PaymentOutcome::Succeeded {
                payment_id,
                signature,
            } => {
                let order = self
                    .client
                    .verify_payment(&PaymentVerification {
                        order_id: payment.order_id,
                        payment_id,
                        signature,
                    })
                    .await?;
                info!(order_id = %order.id, "Payment verified");

                let cart = self.client.cart().await?;
                Ok(CheckoutOutcome::Paid { order, cart })
            }
            PaymentOutcome::Dismissed => {
                info!(order_id = %payment.order_id, "Payment dismissed");
                Ok(CheckoutOutcome::Dismissed {
                    order_id: payment.order_id,
                })
            }
            PaymentOutcome::Failed { reason } => {
                warn!(order_id = %payment.order_id, reason = %reason, "Payment failed");
                Err(ApiError::Payment(reason))
            }
        }
    }
}
