//! # Admin Commands
//!
//! Every command checks the cached role first; a non-admin never sends the
//! request.

use storefront_api::Metrics;
use storefront_core::{Order, OrderStatus};
use tracing::{debug, info};

use crate::error::AppResult;
use crate::state::AppState;

pub async fn orders(state: &AppState, status: Option<OrderStatus>) -> AppResult<Vec<Order>> {
    debug!(status = ?status, "admin orders command");
    state.session.require_admin(&state.api).await?;
    Ok(state.api.admin_orders(status).await?)
}

pub async fn set_status(state: &AppState, id: &str, status: OrderStatus) -> AppResult<Order> {
    debug!(id = %id, status = %status, "admin set-status command");
    let admin = state.session.require_admin(&state.api).await?;

    let order = state.api.set_order_status(id, status).await?;
    info!(order_id = %order.id, status = %order.status, by = %admin.email, "Status updated");
    Ok(order)
}

pub async fn metrics(state: &AppState) -> AppResult<Metrics> {
    debug!("admin metrics command");
    state.session.require_admin(&state.api).await?;
    Ok(state.api.metrics().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{cart, checkout};
    use crate::error::ErrorCode;
    use crate::state::testing::signed_in;
    use storefront_api::test_support::MockBackend;
    use storefront_api::PlaceOrderRequest;
    use storefront_core::{PaymentMethod, PurchaseType};

    #[tokio::test]
    async fn test_non_admin_is_refused_locally() {
        let backend = MockBackend::start().await;
        let state = signed_in(&backend, "tok-user").await;

        let err = orders(&state, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = metrics(&state).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_admin_moves_order_along() {
        let backend = MockBackend::start().await;

        let customer = signed_in(&backend, "tok-basic").await;
        cart::add(&customer, "p-1", 1, PurchaseType::Normal).await.unwrap();
        let request = PlaceOrderRequest {
            payment_method: PaymentMethod::CashOnDelivery,
            ..Default::default()
        };
        let gateway = checkout::TerminalGateway::default();
        checkout::checkout(&customer, &request, &gateway, None).await.unwrap();

        let admin = signed_in(&backend, "tok-admin").await;
        let placed = orders(&admin, Some(OrderStatus::Placed)).await.unwrap();
        assert_eq!(placed.len(), 1);

        let shipped = set_status(&admin, &placed[0].id, OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);
        assert!(orders(&admin, Some(OrderStatus::Placed)).await.unwrap().is_empty());

        // Customer can no longer cancel.
        let err = checkout::cancel(&customer, &shipped.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_metrics_include_health() {
        let backend = MockBackend::start().await;
        let admin = signed_in(&backend, "tok-admin").await;

        let metrics = metrics(&admin).await.unwrap();
        assert!(metrics.health.is_up());
    }
}
