//! The signed-in cart. Every mutation returns the cart as the backend
//! now sees it; callers never keep a summary from before the change.

use serde::Serialize;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::ApiResult;
use storefront_core::pricing::{ensure_affordable, resolve_purchase};
use storefront_core::validation::validate_quantity;
use storefront_core::{Cart, CoreError, Product, PurchaseType, User};

/// Body of `POST /api/cart/items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: i64,
    pub purchase_type: PurchaseType,
}

impl AddToCartRequest {
    /// Builds the request with the purchase type the product and user
    /// actually allow.
    ///
    /// A discounted product, a guest or a non-card-holder always sends
    /// NORMAL. Points-based requests are checked against the balance.
    pub fn for_product(
        product: &Product,
        user: Option<&User>,
        quantity: i64,
        requested: PurchaseType,
    ) -> Result<Self, CoreError> {
        validate_quantity(quantity)?;
        if !product.in_stock {
            return Err(CoreError::OutOfStock(product.id.clone()));
        }

        let quote = resolve_purchase(product, user, requested);
        if let Some(user) = user {
            ensure_affordable(&quote.for_quantity(quantity), user)?;
        }

        Ok(AddToCartRequest {
            product_id: product.id.clone(),
            quantity,
            purchase_type: quote.purchase_type,
        })
    }
}

/// Body of `PUT /api/cart/items/{productId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_type: Option<PurchaseType>,
}

impl ApiClient {
    pub async fn cart(&self) -> ApiResult<Cart> {
        self.get("/api/cart").await
    }

    pub async fn add_to_cart(&self, request: &AddToCartRequest) -> ApiResult<Cart> {
        debug!(
            product_id = %request.product_id,
            quantity = request.quantity,
            purchase_type = %request.purchase_type,
            "Adding to cart"
        );
        let builder = self
            .request(reqwest::Method::POST, "/api/cart/items")
            .await?
            .json(request);
        self.send_empty(builder).await?;
        self.cart().await
    }

    pub async fn update_cart_item(
        &self,
        product_id: &str,
        request: &UpdateCartItemRequest,
    ) -> ApiResult<Cart> {
        let builder = self
            .request(reqwest::Method::PUT, &format!("/api/cart/items/{}", product_id))
            .await?
            .json(request);
        self.send_empty(builder).await?;
        self.cart().await
    }

    pub async fn remove_cart_item(&self, product_id: &str) -> ApiResult<Cart> {
        self.delete(&format!("/api/cart/items/{}", product_id)).await?;
        self.cart().await
    }

    pub async fn clear_cart(&self) -> ApiResult<()> {
        self.delete("/api/cart").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBackend;
    use storefront_core::{Money, Points};

    #[tokio::test]
    async fn test_n_identical_items_total_n_times_price() {
        let backend = MockBackend::start().await;
        let client = backend.client(Some("tok-user"));
        let rice = client.product("p-1").await.unwrap();

        let mut cart = Cart::default();
        for _ in 0..3 {
            let request = AddToCartRequest::for_product(&rice, None, 1, PurchaseType::Normal).unwrap();
            cart = client.add_to_cart(&request).await.unwrap();
        }

        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.summary.mrp_total, Money::from_major(3000));
        assert_eq!(cart.summary.e_points_discount, Money::zero());
    }

    #[tokio::test]
    async fn test_partial_redemption_summary() {
        let backend = MockBackend::start().await;
        let client = backend.client(Some("tok-user"));
        let user = client.me().await.unwrap();
        let rice = client.product("p-1").await.unwrap();

        let request =
            AddToCartRequest::for_product(&rice, Some(&user), 1, PurchaseType::PartialEp).unwrap();
        assert_eq!(request.purchase_type, PurchaseType::PartialEp);

        let cart = client.add_to_cart(&request).await.unwrap();
        assert_eq!(cart.items[0].points_used, Points::new(370));
        assert_eq!(cart.summary.e_points_discount, Money::from_major(370));
        assert_eq!(cart.summary.total_payable, Money::from_major(645));
    }

    #[tokio::test]
    async fn test_discounted_product_forced_normal() {
        let backend = MockBackend::start().await;
        let client = backend.client(Some("tok-user"));
        let user = client.me().await.unwrap();
        let oil = client.product("p-2").await.unwrap();

        let request =
            AddToCartRequest::for_product(&oil, Some(&user), 2, PurchaseType::FullEp).unwrap();
        assert_eq!(request.purchase_type, PurchaseType::Normal);

        let cart = client.add_to_cart(&request).await.unwrap();
        assert_eq!(cart.items[0].points_used, Points::zero());
        assert_eq!(cart.summary.mrp_total, Money::from_major(900));
    }

    #[test]
    fn test_insufficient_points() {
        let product = Product {
            id: "p".to_string(),
            name: "TV".to_string(),
            brand: None,
            normal_price: Money::from_major(30000),
            discount_percent: None,
            image_url: None,
            category: None,
            description: None,
            in_stock: true,
        };
        let user = User {
            id: "u".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.in".to_string(),
            phone: None,
            card_holder: true,
            e_points: Points::new(100),
            role: Default::default(),
        };

        let err = AddToCartRequest::for_product(&product, Some(&user), 1, PurchaseType::FullEp)
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientPoints { required: 30000, available: 100 }));
    }

    #[tokio::test]
    async fn test_update_remove_clear() {
        let backend = MockBackend::start().await;
        let client = backend.client(Some("tok-user"));
        let rice = client.product("p-1").await.unwrap();
        let oil = client.product("p-2").await.unwrap();

        for product in [&rice, &oil] {
            let request = AddToCartRequest::for_product(product, None, 1, PurchaseType::Normal).unwrap();
            client.add_to_cart(&request).await.unwrap();
        }

        let update = UpdateCartItemRequest {
            quantity: 4,
            purchase_type: None,
        };
        let cart = client.update_cart_item("p-2", &update).await.unwrap();
        assert_eq!(cart.total_quantity(), 5);

        let cart = client.remove_cart_item("p-1").await.unwrap();
        assert_eq!(cart.items.len(), 1);

        client.clear_cart().await.unwrap();
        assert!(client.cart().await.unwrap().is_empty());
    }
}
