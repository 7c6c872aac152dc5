//! # Session State
//!
//! Who is signed in, backed by the single-row `session` table.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │  login ──► ApiClient::login ──► TokenStore::save ──► session.token     │
//! │                    │                                                   │
//! │                    └──► SessionState::remember ─────► session.user     │
//! │                                                                        │
//! │  whoami ──► cached user ── missing? ──► GET /api/auth/me ──► cache it  │
//! │                                                                        │
//! │  401 from any command ──► SessionState::forget ──► row deleted         │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use storefront_api::{ApiClient, ApiError, ApiResult, TokenStore};
use storefront_core::User;
use storefront_db::{DbError, SessionRepository};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

// =============================================================================
// Token Store
// =============================================================================

/// `TokenStore` over the SQLite session row.
#[derive(Debug, Clone)]
pub struct SqliteTokenStore {
    repo: SessionRepository,
}

impl SqliteTokenStore {
    pub fn new(repo: SessionRepository) -> Self {
        SqliteTokenStore { repo }
    }
}

fn storage(err: DbError) -> ApiError {
    ApiError::TokenStore(err.to_string())
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn load(&self) -> ApiResult<Option<String>> {
        self.repo.token().await.map_err(storage)
    }

    async fn save(&self, token: &str) -> ApiResult<()> {
        self.repo.save(token, None).await.map_err(storage)
    }

    async fn clear(&self) -> ApiResult<()> {
        self.repo.clear().await.map_err(storage)
    }
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Clone)]
pub struct SessionState {
    repo: SessionRepository,
}

impl SessionState {
    pub fn new(repo: SessionRepository) -> Self {
        SessionState { repo }
    }

    /// Caches the profile next to the token.
    pub async fn remember(&self, user: &User) -> AppResult<()> {
        self.repo.update_user(user).await?;
        debug!(user = %user.email, "Profile cached");
        Ok(())
    }

    /// Drops the token and the cached profile.
    pub async fn forget(&self) -> AppResult<()> {
        self.repo.clear().await?;
        info!("Local session cleared");
        Ok(())
    }

    /// The signed-in user, or `None` in guest mode.
    ///
    /// Uses the cached profile when there is one.
    pub async fn current_user(&self, api: &ApiClient) -> AppResult<Option<User>> {
        if !api.is_authenticated().await? {
            return Ok(None);
        }

        if let Some(user) = self.repo.load().await?.and_then(|s| s.user) {
            return Ok(Some(user));
        }

        self.refresh_user(api).await.map(Some)
    }

    /// Fetches the profile from the backend and caches it.
    ///
    /// Used wherever the e-points balance must be current.
    pub async fn refresh_user(&self, api: &ApiClient) -> AppResult<User> {
        let user = api.me().await?;
        self.remember(&user).await?;
        Ok(user)
    }

    /// The signed-in user, or `Unauthorized`.
    pub async fn require_user(&self, api: &ApiClient) -> AppResult<User> {
        self.current_user(api)
            .await?
            .ok_or_else(|| AppError::unauthorized("Sign in first: storefront login"))
    }

    /// The signed-in user if they are an admin. Checked before any admin request.
    pub async fn require_admin(&self, api: &ApiClient) -> AppResult<User> {
        let user = self.require_user(api).await?;
        if !user.is_admin() {
            return Err(AppError::forbidden("Admin access required"));
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_db::{Database, DbConfig};

    async fn repo() -> SessionRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().session()
    }

    #[tokio::test]
    async fn test_token_store_round_trip() {
        let store = SqliteTokenStore::new(repo().await);

        assert_eq!(store.load().await.unwrap(), None);
        store.save("tok-user").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("tok-user"));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }
}
