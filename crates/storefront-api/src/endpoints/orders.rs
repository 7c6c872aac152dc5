//! Order placement, history, cancellation and payment verification.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiResult;
use storefront_core::{Order, PaymentMethod};

/// Header carrying a per-checkout key. The backend answers a repeated key
/// with the order it already placed instead of placing another.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Fresh key for a new checkout.
pub fn new_idempotency_key() -> String {
    Uuid::new_v4().to_string()
}

/// Body of `POST /api/orders`. Exactly one of address or store is expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
}

/// A freshly placed order plus the gateway reference for paying it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    #[serde(flatten)]
    pub order: Order,
    #[serde(default, alias = "razorpayOrderId", alias = "gatewayOrderId")]
    pub payment_ref: Option<String>,
}

/// Body of `POST /api/payments/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

impl ApiClient {
    /// Places an order. Resending with the same `idempotency_key` returns
    /// the order from the first attempt.
    pub async fn place_order(
        &self,
        request: &PlaceOrderRequest,
        idempotency_key: &str,
    ) -> ApiResult<PlacedOrder> {
        let builder = self
            .request(reqwest::Method::POST, "/api/orders")
            .await?
            .header(IDEMPOTENCY_HEADER, idempotency_key)
            .json(request);

        let placed: PlacedOrder = self.send_json(builder).await?;
        info!(order_id = %placed.order.id, status = %placed.order.status, "Order placed");
        Ok(placed)
    }

    pub async fn orders(&self) -> ApiResult<Vec<Order>> {
        self.get("/api/orders").await
    }

    pub async fn order(&self, id: &str) -> ApiResult<Order> {
        self.get(&format!("/api/orders/{}", id)).await
    }

    pub async fn cancel_order(&self, id: &str) -> ApiResult<Order> {
        let builder = self
            .request(reqwest::Method::POST, &format!("/api/orders/{}/cancel", id))
            .await?;
        let order: Order = self.send_json(builder).await?;
        info!(order_id = %order.id, "Order cancelled");
        Ok(order)
    }

    pub async fn verify_payment(&self, verification: &PaymentVerification) -> ApiResult<Order> {
        self.post("/api/payments/verify", verification).await
    }
}
