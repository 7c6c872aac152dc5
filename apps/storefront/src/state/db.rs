//! # Database State
//!
//! Wraps the local `Database` for use in commands.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn show(state: &AppState) -> AppResult<CartView> {
//!     let guest = state.db.inner().guest_cart().load().await?;
//!     ...
//! }
//! ```

use storefront_db::{Database, DbConfig};

use crate::error::AppResult;

/// Wrapper around `Database` held by `AppState`.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Opens the file at `config`, applying migrations.
    pub async fn open(config: DbConfig) -> AppResult<Self> {
        Ok(DbState::new(Database::new(config).await?))
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
