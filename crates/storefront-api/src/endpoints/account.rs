//! Addresses, pickup stores and the loyalty card.

use tracing::info;

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use storefront_core::validation::validate_address;
use storefront_core::{Address, CoreError, LoyaltyCardApplication, Store};

impl ApiClient {
    pub async fn addresses(&self) -> ApiResult<Vec<Address>> {
        self.get("/api/addresses").await
    }

    /// Saves a new address. Fails locally when a required field is missing.
    pub async fn add_address(&self, address: &Address) -> Result<Address, AddressError> {
        validate_address(address).map_err(CoreError::from)?;
        Ok(self.post("/api/addresses", address).await?)
    }

    pub async fn delete_address(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/api/addresses/{}", id)).await
    }

    /// Pickup locations.
    pub async fn stores(&self) -> ApiResult<Vec<Store>> {
        self.get("/api/stores").await
    }

    pub async fn apply_loyalty_card(&self) -> ApiResult<LoyaltyCardApplication> {
        let builder = self
            .request(reqwest::Method::POST, "/api/loyalty/apply")
            .await?;
        let application: LoyaltyCardApplication = self.send_json(builder).await?;
        info!(status = ?application.status, "Loyalty card application submitted");
        Ok(application)
    }

    /// Current application, or `None` when the user never applied.
    pub async fn loyalty_status(&self) -> ApiResult<Option<LoyaltyCardApplication>> {
        match self.get("/api/loyalty/status").await {
            Ok(application) => Ok(Some(application)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Adding an address can fail before or after the request.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error(transparent)]
    Invalid(#[from] CoreError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
