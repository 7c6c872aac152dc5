//! # Loyalty Card Commands
//!
//! Card holders may pay with e-points. Applying is one request; approval
//! happens on the backend.

use storefront_core::LoyaltyCardApplication;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub async fn apply(state: &AppState) -> AppResult<LoyaltyCardApplication> {
    debug!("loyalty apply command");

    let user = state.session.refresh_user(&state.api).await?;
    if user.card_holder {
        return Err(AppError::business("You already hold a loyalty card"));
    }

    let application = state.api.apply_loyalty_card().await?;
    info!(status = ?application.status, "Loyalty card application submitted");
    Ok(application)
}

/// `None` when the user never applied.
pub async fn status(state: &AppState) -> AppResult<Option<LoyaltyCardApplication>> {
    debug!("loyalty status command");
    state.session.require_user(&state.api).await?;
    Ok(state.api.loyalty_status().await?)
}
