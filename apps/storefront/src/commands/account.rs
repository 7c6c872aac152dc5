//! # Account Commands
//!
//! Sign in, sign up, sign out. The token ends up in the `session` row via
//! `SqliteTokenStore`; the profile is cached next to it.

use storefront_api::RegisterRequest;
use storefront_core::User;
use tracing::{debug, info};

use crate::error::AppResult;
use crate::state::AppState;

pub async fn login(state: &AppState, email: &str, password: &str) -> AppResult<User> {
    debug!(email = %email, "login command");

    let user = state.api.login(email, password).await?;
    state.session.remember(&user).await?;

    info!(user = %user.email, card_holder = user.card_holder, "Signed in");
    Ok(user)
}

/// Validates locally, creates the account and signs in with it.
pub async fn register(state: &AppState, request: &RegisterRequest) -> AppResult<User> {
    debug!(email = %request.email, "register command");

    request.validate()?;
    let user = state.api.register(request).await?;
    state.session.remember(&user).await?;

    info!(user = %user.email, "Account created");
    Ok(user)
}

/// Signing out twice is not an error.
pub async fn logout(state: &AppState) -> AppResult<()> {
    debug!("logout command");
    state.api.logout().await?;
    state.session.forget().await
}

/// The signed-in user, `None` in guest mode.
pub async fn whoami(state: &AppState) -> AppResult<Option<User>> {
    debug!("whoami command");
    state.session.current_user(&state.api).await
}
