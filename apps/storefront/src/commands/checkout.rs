//! # Checkout & Order Commands
//!
//! ## Paying From a Terminal
//! There is no payment widget in a terminal. The customer pays through the
//! gateway link shown for the order and hands the confirmation back:
//!
//! ```text
//! storefront checkout                       → order placed, PENDING_PAYMENT,
//!                                             gateway reference printed
//! storefront pay <order> --payment-id .. --signature ..
//!                                           → verified, PLACED
//!
//! storefront checkout --payment-id .. --signature ..
//!                                           → both in one step
//! storefront checkout --cod                 → no payment step at all
//! ```
//!
//! A checkout that fails on the network prints its idempotency key.
//! Rerunning with `--idempotency-key <key>` picks up the order the first
//! attempt may already have placed.

use async_trait::async_trait;
use storefront_api::{
    CheckoutFlow, CheckoutOutcome, PaymentGateway, PaymentOutcome, PaymentRequest,
    PaymentVerification, PlaceOrderRequest,
};
use storefront_api::ApiError;
use storefront_core::{Order, OrderStatus};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::state::AppState;

// =============================================================================
// Gateway
// =============================================================================

/// Gateway answered from command-line flags.
///
/// | `--payment-id` | `--signature` | Outcome    |
/// |----------------|---------------|------------|
/// | set            | set           | Succeeded  |
/// | unset          | unset         | Dismissed  |
/// | only one       |               | Failed     |
#[derive(Debug, Clone, Default)]
pub struct TerminalGateway {
    payment_id: Option<String>,
    signature: Option<String>,
}

impl TerminalGateway {
    pub fn new(payment_id: Option<String>, signature: Option<String>) -> Self {
        TerminalGateway {
            payment_id,
            signature,
        }
    }
}

#[async_trait]
impl PaymentGateway for TerminalGateway {
    async fn open(&self, request: &PaymentRequest) -> PaymentOutcome {
        info!(
            order_id = %request.order_id,
            amount = %request.amount,
            payment_ref = ?request.payment_ref,
            "Awaiting payment"
        );

        match (&self.payment_id, &self.signature) {
            (Some(payment_id), Some(signature)) => PaymentOutcome::Succeeded {
                payment_id: payment_id.clone(),
                signature: signature.clone(),
            },
            (None, None) => PaymentOutcome::Dismissed,
            _ => PaymentOutcome::Failed {
                reason: "both --payment-id and --signature are required".to_string(),
            },
        }
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// Places an order for the signed-in cart and runs the payment step.
///
/// An empty cart fails with `CartEmpty`, which the caller turns into a
/// pointer back to the catalog.
pub async fn checkout(
    state: &AppState,
    request: &PlaceOrderRequest,
    gateway: &dyn PaymentGateway,
    idempotency_key: Option<&str>,
) -> AppResult<CheckoutOutcome> {
    debug!(payment_method = ?request.payment_method, "checkout command");
    state.session.require_user(&state.api).await?;

    let mut flow = CheckoutFlow::new(&state.api, gateway, &state.checkout);
    if let Some(key) = idempotency_key {
        flow = flow.resume(key);
    }
    let key = flow.idempotency_key().to_string();

    let outcome = match flow.run(request).await {
        Ok(outcome) => outcome,
        Err(ApiError::Network(reason)) => {
            warn!(idempotency_key = %key, "Checkout interrupted");
            return Err(AppError::new(
                ErrorCode::NetworkError,
                format!(
                    "Network error: {}. Retry with `storefront checkout --idempotency-key {}`",
                    reason, key
                ),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    if matches!(outcome, CheckoutOutcome::Paid { .. }) {
        // Balance changed; refresh the cached profile.
        state.session.refresh_user(&state.api).await?;
    }
    Ok(outcome)
}

/// Confirms payment for an order left pending by a dismissed checkout.
pub async fn pay(
    state: &AppState,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> AppResult<Order> {
    debug!(order_id = %order_id, "pay command");
    state.session.require_user(&state.api).await?;

    let order = state.api.order(order_id).await?;
    if order.status != OrderStatus::PendingPayment {
        return Err(AppError::business(format!(
            "Order {} is {}, not awaiting payment",
            order.id, order.status
        )));
    }

    let order = state
        .api
        .verify_payment(&PaymentVerification {
            order_id: order.id,
            payment_id: payment_id.to_string(),
            signature: signature.to_string(),
        })
        .await?;
    state.session.refresh_user(&state.api).await?;
    Ok(order)
}

// =============================================================================
// Orders
// =============================================================================

pub async fn orders(state: &AppState) -> AppResult<Vec<Order>> {
    debug!("orders command");
    state.session.require_user(&state.api).await?;
    Ok(state.api.orders().await?)
}

pub async fn order(state: &AppState, id: &str) -> AppResult<Order> {
    debug!(id = %id, "order command");
    state.session.require_user(&state.api).await?;
    Ok(state.api.order(id).await?)
}

/// Cancels an order the backend still allows cancelling.
///
/// Shipped, delivered and already cancelled orders are refused here
/// without a request.
pub async fn cancel(state: &AppState, id: &str) -> AppResult<Order> {
    debug!(id = %id, "cancel command");
    state.session.require_user(&state.api).await?;

    let order = state.api.order(id).await?;
    if !order.status.is_cancellable() {
        return Err(AppError::business(format!(
            "Order {} is {} and can no longer be cancelled",
            order.id, order.status
        )));
    }

    let order = state.api.cancel_order(id).await?;
    info!(order_id = %order.id, "Order cancelled");
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart;
    use crate::error::ErrorCode;
    use crate::state::testing::{signed_in, state_for};
    use storefront_api::test_support::MockBackend;
    use storefront_core::{PaymentMethod, PurchaseType};

    fn paid() -> TerminalGateway {
        TerminalGateway::new(Some("pay_1".to_string()), Some("sig-ok".to_string()))
    }

    #[tokio::test]
    async fn test_checkout_requires_sign_in() {
        let backend = MockBackend::start().await;
        let state = state_for(&backend).await;
        cart::add(&state, "p-1", 1, PurchaseType::Normal).await.unwrap();

        let err = checkout(&state, &PlaceOrderRequest::default(), &paid(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_empty_cart_is_reported() {
        let backend = MockBackend::start().await;
        let state = signed_in(&backend, "tok-user").await;

        let err = checkout(&state, &PlaceOrderRequest::default(), &paid(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CartEmpty);
        assert!(!state.checkout.is_in_flight());
    }

    #[tokio::test]
    async fn test_paid_checkout_empties_cart() {
        let backend = MockBackend::start().await;
        let state = signed_in(&backend, "tok-user").await;
        cart::add(&state, "p-1", 1, PurchaseType::Normal).await.unwrap();

        let outcome = checkout(&state, &PlaceOrderRequest::default(), &paid(), None)
            .await
            .unwrap();

        match outcome {
            CheckoutOutcome::Paid { order, cart } => {
                assert_eq!(order.status, OrderStatus::Placed);
                assert!(cart.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(orders(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dismissed_checkout_can_be_paid_later() {
        let backend = MockBackend::start().await;
        let state = signed_in(&backend, "tok-user").await;
        cart::add(&state, "p-3", 1, PurchaseType::Normal).await.unwrap();

        let outcome = checkout(&state, &PlaceOrderRequest::default(), &TerminalGateway::default(), None)
            .await
            .unwrap();
        let CheckoutOutcome::Dismissed { order_id } = outcome else {
            panic!("expected dismissal");
        };
        assert_eq!(order(&state, &order_id).await.unwrap().status, OrderStatus::PendingPayment);

        let bad = pay(&state, &order_id, "pay_2", "forged").await.unwrap_err();
        assert_ne!(bad.code, ErrorCode::Unauthorized);

        let order = pay(&state, &order_id, "pay_2", "sig-ok").await.unwrap();
        assert_eq!(order.status, OrderStatus::Placed);

        let again = pay(&state, &order_id, "pay_2", "sig-ok").await.unwrap_err();
        assert_eq!(again.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_resumed_checkout_pays_the_earlier_order() {
        let backend = MockBackend::start().await;
        let state = signed_in(&backend, "tok-user").await;
        cart::add(&state, "p-1", 1, PurchaseType::Normal).await.unwrap();

        let key = "chk-7f3a";
        let outcome = checkout(
            &state,
            &PlaceOrderRequest::default(),
            &TerminalGateway::default(),
            Some(key),
        )
        .await
        .unwrap();
        let CheckoutOutcome::Dismissed { order_id } = outcome else {
            panic!("expected dismissal");
        };

        let outcome = checkout(&state, &PlaceOrderRequest::default(), &paid(), Some(key))
            .await
            .unwrap();
        match outcome {
            CheckoutOutcome::Paid { order, .. } => assert_eq!(order.id, order_id),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(orders(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_backend_reports_the_key() {
        let backend = MockBackend::start().await;
        let mut state = signed_in(&backend, "tok-user").await;
        state.session.refresh_user(&state.api).await.unwrap();
        // Nothing listens on the discard port.
        state.api = storefront_api::ApiClient::new(
            storefront_api::ApiConfig::new("http://127.0.0.1:9")
                .timeout(std::time::Duration::from_secs(2)),
            std::sync::Arc::new(crate::state::SqliteTokenStore::new(state.db.inner().session())),
        )
        .unwrap();

        let err = checkout(&state, &PlaceOrderRequest::default(), &paid(), Some("chk-1"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert!(err.message.contains("--idempotency-key chk-1"));
    }

    #[tokio::test]
    async fn test_half_filled_payment_fails() {
        let backend = MockBackend::start().await;
        let state = signed_in(&backend, "tok-user").await;
        cart::add(&state, "p-1", 1, PurchaseType::Normal).await.unwrap();

        let gateway = TerminalGateway::new(Some("pay_1".to_string()), None);
        let err = checkout(&state, &PlaceOrderRequest::default(), &gateway, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
    }

    #[tokio::test]
    async fn test_cancel_checks_status_locally() {
        let backend = MockBackend::start().await;
        let state = signed_in(&backend, "tok-user").await;
        cart::add(&state, "p-1", 1, PurchaseType::Normal).await.unwrap();

        let request = PlaceOrderRequest {
            payment_method: PaymentMethod::CashOnDelivery,
            store_id: Some("s-1".to_string()),
            ..Default::default()
        };
        let CheckoutOutcome::Placed { order: placed, .. } =
            checkout(&state, &request, &paid(), None).await.unwrap()
        else {
            panic!("expected cash on delivery");
        };

        let cancelled = cancel(&state, &placed.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let err = cancel(&state, &placed.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert!(err.message.contains("CANCELLED"));
    }
}
