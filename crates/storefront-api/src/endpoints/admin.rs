//! Admin views: all orders, status changes, backend metrics.
//!
//! The backend enforces the ADMIN role; the CLI also checks it before
//! calling these.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::ApiResult;
use storefront_core::{Order, OrderStatus};

#[derive(Debug, Serialize)]
struct OrderFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<OrderStatus>,
}

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: OrderStatus,
}

/// `/actuator/health` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("UP")
    }
}

/// Operational snapshot: free-form metric values plus health.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub health: HealthStatus,
    pub values: BTreeMap<String, Value>,
}

impl ApiClient {
    pub async fn admin_orders(&self, status: Option<OrderStatus>) -> ApiResult<Vec<Order>> {
        self.get_query("/api/admin/orders", &OrderFilter { status }).await
    }

    pub async fn set_order_status(&self, id: &str, status: OrderStatus) -> ApiResult<Order> {
        let order: Order = self
            .put(&format!("/api/admin/orders/{}/status", id), &StatusUpdate { status })
            .await?;
        info!(order_id = %order.id, status = %order.status, "Order status changed");
        Ok(order)
    }

    pub async fn health(&self) -> ApiResult<HealthStatus> {
        self.get("/actuator/health").await
    }

    /// Metrics and health together. A failing health probe reads as DOWN.
    pub async fn metrics(&self) -> ApiResult<Metrics> {
        let values: BTreeMap<String, Value> = self.get("/api/admin/metrics").await?;

        let health = match self.health().await {
            Ok(health) => health,
            Err(e) => {
                warn!(error = %e, "Health probe failed");
                HealthStatus {
                    status: "DOWN".to_string(),
                }
            }
        };

        Ok(Metrics { health, values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::cart::AddToCartRequest;
    use crate::endpoints::orders::PlaceOrderRequest;
    use crate::test_support::MockBackend;
    use crate::ApiError;
    use storefront_core::PurchaseType;

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let backend = MockBackend::start().await;
        let err = backend.client(Some("tok-user")).admin_orders(None).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_status_change() {
        let backend = MockBackend::start().await;

        let customer = backend.client(Some("tok-user"));
        let rice = customer.product("p-1").await.unwrap();
        let request = AddToCartRequest::for_product(&rice, None, 1, PurchaseType::Normal).unwrap();
        customer.add_to_cart(&request).await.unwrap();
        let placed = customer.place_order(&PlaceOrderRequest::default(), "key-1").await.unwrap();

        let admin = backend.client(Some("tok-admin"));
        let pending = admin.admin_orders(Some(OrderStatus::PendingPayment)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert!(admin.admin_orders(Some(OrderStatus::Shipped)).await.unwrap().is_empty());

        let shipped = admin
            .set_order_status(&placed.order.id, OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn test_metrics() {
        let backend = MockBackend::start().await;
        let metrics = backend.client(Some("tok-admin")).metrics().await.unwrap();

        assert!(metrics.health.is_up());
        assert_eq!(metrics.values.get("orders.total"), Some(&Value::from(0)));
    }
}
