//! # State Module
//!
//! Everything a command needs, built once per invocation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         AppState                                        │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │   DbState    │  │ SessionState │  │  CartState   │  │ConfigState │  │
//! │  │              │  │              │  │              │  │            │  │
//! │  │  Database    │  │  token +     │  │  Arc<Mutex<  │  │  ₹, fees   │  │
//! │  │  (SQLite     │  │  cached user │  │  GuestCart>> │  │            │  │
//! │  │   pool)      │  │              │  │              │  │            │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  ┌──────────────────────────────┐  ┌──────────────────────────────┐    │
//! │  │  ApiClient                   │  │  CheckoutGuard               │    │
//! │  │  bearer from SqliteTokenStore│  │  one payment at a time       │    │
//! │  └──────────────────────────────┘  └──────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod db;
mod session;

pub use cart::CartState;
pub use config::ConfigState;
pub use db::DbState;
pub use session::{SessionState, SqliteTokenStore};

use std::sync::Arc;

use storefront_api::{ApiClient, ApiConfig, CheckoutGuard};
use storefront_db::{Database, DbConfig};
use tracing::info;

use crate::config::AppConfig;
use crate::error::AppResult;

pub struct AppState {
    pub config: ConfigState,
    pub db: DbState,
    pub session: SessionState,
    pub cart: CartState,
    pub api: ApiClient,
    pub checkout: CheckoutGuard,
}

impl AppState {
    /// Opens the local database under the data directory and wires the client.
    pub async fn new(config: &AppConfig) -> AppResult<Self> {
        let db_path = config.database_path()?;
        info!(db_path = %db_path.display(), "Database path determined");

        let db = DbState::open(DbConfig::new(db_path)).await?;
        Self::with_database(config, db.inner().clone()).await
    }

    /// Builds state on an already open database.
    pub async fn with_database(config: &AppConfig, db: Database) -> AppResult<Self> {
        let tokens = Arc::new(SqliteTokenStore::new(db.session()));
        let api = ApiClient::new(
            ApiConfig::new(config.api_url.as_str()).timeout(config.timeout()),
            tokens,
        )?;

        let cart = CartState::load(db.guest_cart()).await?;

        Ok(AppState {
            config: ConfigState::from_config(config),
            session: SessionState::new(db.session()),
            db: DbState::new(db),
            cart,
            api,
            checkout: CheckoutGuard::new(),
        })
    }
}
