//! Product listing, product details and categories.

use serde::Serialize;

use crate::client::ApiClient;
use crate::error::ApiResult;
use storefront_core::validation::validate_search_query;
use storefront_core::{Category, Page, Product, ValidationError};

/// Default page size for product listings.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Query parameters for `GET /api/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductQuery {
    pub page: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        ProductQuery {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            q: None,
            category: None,
        }
    }
}

impl ProductQuery {
    /// Sets the search text. Blank text clears it.
    pub fn search(mut self, q: &str) -> Result<Self, ValidationError> {
        let q = validate_search_query(q)?;
        self.q = (!q.is_empty()).then_some(q);
        Ok(self)
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

impl ApiClient {
    pub async fn products(&self, query: &ProductQuery) -> ApiResult<Page<Product>> {
        self.get_query("/api/products", query).await
    }

    pub async fn product(&self, id: &str) -> ApiResult<Product> {
        self.get(&format!("/api/products/{}", id)).await
    }

    pub async fn categories(&self) -> ApiResult<Vec<Category>> {
        self.get("/api/categories").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBackend;
    use crate::ApiError;
    use storefront_core::pricing::effective_price;
    use storefront_core::Money;

    #[tokio::test]
    async fn test_search_and_filter() {
        let backend = MockBackend::start().await;
        let client = backend.client(None);

        let all = client.products(&ProductQuery::default()).await.unwrap();
        assert_eq!(all.total_elements, 3);

        let rice = client
            .products(&ProductQuery::default().search(" rice ").unwrap())
            .await
            .unwrap();
        assert_eq!(rice.content.len(), 1);
        assert_eq!(rice.content[0].id, "p-1");

        let home = client
            .products(&ProductQuery::default().category("home"))
            .await
            .unwrap();
        assert_eq!(home.content.len(), 1);
        assert_eq!(home.content[0].normal_price, Money::from_minor(39950));
    }

    #[tokio::test]
    async fn test_paging() {
        let backend = MockBackend::start().await;
        let client = backend.client(None);

        let mut query = ProductQuery::default();
        query.size = 2;

        let first = client.products(&query).await.unwrap();
        assert_eq!(first.content.len(), 2);
        assert!(first.has_next());

        let second = client.products(&query.page(1)).await.unwrap();
        assert_eq!(second.content.len(), 1);
        assert!(!second.has_next());
    }

    #[tokio::test]
    async fn test_product_details() {
        let backend = MockBackend::start().await;
        let client = backend.client(None);

        let oil = client.product("p-2").await.unwrap();
        assert!(oil.has_discount());
        assert_eq!(effective_price(&oil), Money::from_major(450));

        let err = client.product("nope").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_categories() {
        let backend = MockBackend::start().await;
        let names: Vec<String> = backend
            .client(None)
            .categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Grocery", "Home"]);
    }

    #[test]
    fn test_blank_search_is_dropped() {
        let query = ProductQuery::default().search("   ").unwrap();
        assert_eq!(query.q, None);
    }
}
