//! # Address & Store Commands
//!
//! Delivery addresses belong to the signed-in account. Stores are public
//! pickup points.

use storefront_core::{Address, Store};
use tracing::{debug, info};

use crate::error::AppResult;
use crate::state::AppState;

pub async fn list(state: &AppState) -> AppResult<Vec<Address>> {
    debug!("addresses list command");
    state.session.require_user(&state.api).await?;
    Ok(state.api.addresses().await?)
}

/// Rejected locally when incomplete.
pub async fn add(state: &AppState, address: &Address) -> AppResult<Address> {
    debug!(city = %address.city, "addresses add command");
    state.session.require_user(&state.api).await?;

    let saved = state.api.add_address(address).await?;
    info!(id = ?saved.id, "Address saved");
    Ok(saved)
}

pub async fn remove(state: &AppState, id: &str) -> AppResult<()> {
    debug!(id = %id, "addresses remove command");
    state.session.require_user(&state.api).await?;
    Ok(state.api.delete_address(id).await?)
}

pub async fn stores(state: &AppState) -> AppResult<Vec<Store>> {
    debug!("stores command");
    Ok(state.api.stores().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::testing::{signed_in, state_for};
    use storefront_api::test_support::MockBackend;

    fn home() -> Address {
        Address {
            id: None,
            label: Some("Home".to_string()),
            line1: "12 MG Road".to_string(),
            line2: None,
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            pincode: "560001".to_string(),
            phone: "9876543210".to_string(),
            is_default: true,
        }
    }

    #[tokio::test]
    async fn test_add_list_remove() {
        let backend = MockBackend::start().await;
        let state = signed_in(&backend, "tok-user").await;

        let saved = add(&state, &home()).await.unwrap();
        let id = saved.id.clone().unwrap();
        assert_eq!(list(&state).await.unwrap(), vec![saved]);

        remove(&state, &id).await.unwrap();
        assert!(list(&state).await.unwrap().is_empty());

        let err = remove(&state, &id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_invalid_pincode_rejected_locally() {
        let backend = MockBackend::start().await;
        let state = signed_in(&backend, "tok-user").await;

        let address = Address {
            pincode: "56".to_string(),
            ..home()
        };
        let err = add(&state, &address).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(list(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stores_are_public() {
        let backend = MockBackend::start().await;
        let state = state_for(&backend).await;

        let stores = stores(&state).await.unwrap();
        assert_eq!(stores.len(), 2);
        assert_eq!(stores[0].city, "Kochi");
    }
}
