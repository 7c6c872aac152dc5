//! # Storefront CLI Library
//!
//! Everything behind the `storefront` binary: parse, load config, build
//! state, run one command, print the result.
//!
//! ## Module Organization
//! ```text
//! storefront_lib/
//! ├── lib.rs          ◄─── You are here (tracing setup & dispatch)
//! ├── cli.rs          ◄─── clap definitions
//! ├── config.rs       ◄─── AppConfig (defaults → file → env)
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState
//! │   ├── db.rs       ◄─── Database wrapper
//! │   ├── session.rs  ◄─── SqliteTokenStore, signed-in user
//! │   ├── cart.rs     ◄─── Guest cart (Arc<Mutex<_>> + SQLite)
//! │   └── config.rs   ◄─── Currency and fee schedule
//! ├── commands/       ◄─── One function per action
//! ├── render.rs       ◄─── Tables for stdout
//! └── error.rs        ◄─── AppError
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Load configuration (defaults, storefront.toml, STOREFRONT_*)        │
//! │  2. Initialize logging (stderr, RUST_LOG or log_filter)                 │
//! │  3. Open local database (WAL, migrations)                               │
//! │  4. Build state (session, guest cart, API client)                       │
//! │  5. Dispatch the command and print its result                           │
//! │                                                                         │
//! │  401 from the backend ──► local session cleared, "sign in again"        │
//! │  CART_EMPTY at checkout ──► first catalog page shown instead            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod state;

use storefront_api::{PlaceOrderRequest, ProductQuery, RegisterRequest};
use storefront_core::Address;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{
    AddressesSubcommand, AdminSubcommand, CartSubcommand, Cli, Commands, LoyaltySubcommand,
};
use commands::checkout::TerminalGateway;
use config::AppConfig;
use error::{AppError, AppResult, ErrorCode};
use render::{emit, output};
use state::AppState;

/// Runs one CLI invocation.
pub async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(config.log_filter());

    info!(api_url = %config.api_url, "Starting storefront");
    let state = AppState::new(&config).await?;

    let result = dispatch(&state, cli.json, cli.command).await;

    if let Some(text) = handle_outcome(&state, cli.json, result).await? {
        println!("{}", text);
    }
    Ok(())
}

/// Turns the errors with a dedicated recovery into their outcome.
///
/// - 401: the stored session is cleared and the user is asked to sign in
///   again.
/// - `CART_EMPTY`: the first catalog page is returned for printing in
///   place of an error.
///
/// Everything else passes through unchanged.
pub async fn handle_outcome(
    state: &AppState,
    json: bool,
    result: AppResult<()>,
) -> AppResult<Option<String>> {
    match result {
        Ok(()) => Ok(None),
        Err(err) if err.is_unauthorized() => {
            warn!("Backend rejected the session");
            state.session.forget().await?;
            Err(AppError::unauthorized(format!(
                "{}. Sign in again with `storefront login`",
                err.message
            )))
        }
        Err(err) if err.code == ErrorCode::CartEmpty => {
            let page = commands::catalog::products(state, &ProductQuery::default()).await?;
            let value = serde_json::json!({ "cartEmpty": true, "products": &page });
            output(json, &value, || {
                format!(
                    "Your cart is empty. Browse products:\n{}",
                    render::products(&page, &state.config)
                )
            })
            .map(Some)
        }
        Err(err) => Err(err),
    }
}

/// Initializes the tracing subscriber. Output goes to stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront=trace` - Trace for the storefront crates only
/// - Default: `info,storefront=debug,sqlx=warn` or `log_filter` from config
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn dispatch(state: &AppState, json: bool, command: Commands) -> AppResult<()> {
    let config = &state.config;

    match command {
        // Account
        Commands::Login(args) => {
            let user = commands::account::login(state, &args.email, &args.password).await?;
            emit(json, &user, || render::user(Some(&user)))
        }
        Commands::Register(args) => {
            let request = RegisterRequest {
                name: args.name,
                email: args.email,
                password: args.password,
                phone: args.phone,
            };
            let user = commands::account::register(state, &request).await?;
            emit(json, &user, || render::user(Some(&user)))
        }
        Commands::Logout => {
            commands::account::logout(state).await?;
            emit(json, &serde_json::json!({ "signedOut": true }), || "Signed out".to_string())
        }
        Commands::Whoami => {
            let user = commands::account::whoami(state).await?;
            emit(json, &user, || render::user(user.as_ref()))
        }

        // Catalog
        Commands::Products(args) => {
            let mut query = ProductQuery::default().page(args.page);
            query.size = args.size.max(1);
            if let Some(q) = &args.q {
                query = query.search(q)?;
            }
            if let Some(category) = args.category {
                query = query.category(category);
            }
            let page = commands::catalog::products(state, &query).await?;
            emit(json, &page, || render::products(&page, config))
        }
        Commands::Product { id } => {
            let details = commands::catalog::product(state, &id).await?;
            emit(json, &details, || render::product(&details, config))
        }
        Commands::Categories => {
            let categories = commands::catalog::categories(state).await?;
            emit(json, &categories, || render::categories(&categories))
        }

        // Cart
        Commands::Cart(cart) => {
            let view = match cart.command {
                CartSubcommand::Show => commands::cart::show(state).await?,
                CartSubcommand::Add {
                    product_id,
                    qty,
                    purchase_type,
                } => commands::cart::add(state, &product_id, qty, purchase_type).await?,
                CartSubcommand::Update { product_id, qty } => {
                    commands::cart::update(state, &product_id, qty).await?
                }
                CartSubcommand::Remove { product_id } => {
                    commands::cart::remove(state, &product_id).await?
                }
                CartSubcommand::Clear => commands::cart::clear(state).await?,
            };
            emit(json, &view, || render::cart(&view, config))
        }

        // Checkout & orders
        Commands::Checkout(args) => {
            let request = PlaceOrderRequest {
                payment_method: args.payment_method(),
                address_id: args.address,
                store_id: args.store,
            };
            let gateway = TerminalGateway::new(args.payment_id, args.signature);
            let outcome = commands::checkout::checkout(
                state,
                &request,
                &gateway,
                args.idempotency_key.as_deref(),
            )
            .await?;
            emit(json, &checkout_json(&outcome), || render::checkout(&outcome, config))
        }
        Commands::Pay(args) => {
            let order =
                commands::checkout::pay(state, &args.order_id, &args.payment_id, &args.signature)
                    .await?;
            emit(json, &order, || render::order(&order, config))
        }
        Commands::Orders => {
            let orders = commands::checkout::orders(state).await?;
            emit(json, &orders, || render::orders(&orders, config))
        }
        Commands::Order { id } => {
            let order = commands::checkout::order(state, &id).await?;
            emit(json, &order, || render::order(&order, config))
        }
        Commands::Cancel { id } => {
            let order = commands::checkout::cancel(state, &id).await?;
            emit(json, &order, || render::order(&order, config))
        }

        // Addresses, stores, loyalty
        Commands::Addresses(addresses) => match addresses.command {
            AddressesSubcommand::List => {
                let list = commands::addresses::list(state).await?;
                emit(json, &list, || render::addresses(&list))
            }
            AddressesSubcommand::Add(args) => {
                let address = Address {
                    id: None,
                    label: args.label,
                    line1: args.line1,
                    line2: args.line2,
                    city: args.city,
                    state: args.state,
                    pincode: args.pincode,
                    phone: args.phone,
                    is_default: args.default,
                };
                let saved = commands::addresses::add(state, &address).await?;
                emit(json, &saved, || render::addresses(std::slice::from_ref(&saved)))
            }
            AddressesSubcommand::Remove { id } => {
                commands::addresses::remove(state, &id).await?;
                emit(json, &serde_json::json!({ "removed": &id }), || {
                    format!("Address {} removed", id)
                })
            }
        },
        Commands::Stores => {
            let stores = commands::addresses::stores(state).await?;
            emit(json, &stores, || render::stores(&stores))
        }
        Commands::Loyalty(loyalty) => {
            let application = match loyalty.command {
                LoyaltySubcommand::Apply => Some(commands::loyalty::apply(state).await?),
                LoyaltySubcommand::Status => commands::loyalty::status(state).await?,
            };
            emit(json, &application, || render::loyalty(application.as_ref()))
        }

        // Admin
        Commands::Admin(admin) => match admin.command {
            AdminSubcommand::Orders { status } => {
                let orders = commands::admin::orders(state, status).await?;
                emit(json, &orders, || render::orders(&orders, config))
            }
            AdminSubcommand::SetStatus { order_id, status } => {
                let order = commands::admin::set_status(state, &order_id, status).await?;
                emit(json, &order, || render::order(&order, config))
            }
            AdminSubcommand::Metrics => {
                let metrics = commands::admin::metrics(state).await?;
                emit(json, &metrics, || render::metrics(&metrics))
            }
        },
    }
}

/// JSON shape of a checkout result.
fn checkout_json(outcome: &storefront_api::CheckoutOutcome) -> serde_json::Value {
    use storefront_api::CheckoutOutcome;

    match outcome {
        CheckoutOutcome::Placed { order, .. } => {
            serde_json::json!({ "outcome": "placed", "order": order })
        }
        CheckoutOutcome::Paid { order, .. } => {
            serde_json::json!({ "outcome": "paid", "order": order })
        }
        CheckoutOutcome::Dismissed { order_id } => {
            serde_json::json!({ "outcome": "dismissed", "orderId": order_id })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use state::testing::{signed_in, state_for};
    use storefront_api::test_support::MockBackend;

    #[tokio::test]
    async fn test_empty_cart_checkout_shows_catalog() {
        let backend = MockBackend::start().await;
        let state = signed_in(&backend, "tok-user").await;

        let result = commands::checkout::checkout(
            &state,
            &PlaceOrderRequest::default(),
            &TerminalGateway::default(),
            None,
        )
        .await
        .map(|_| ());

        let text = handle_outcome(&state, false, result).await.unwrap().unwrap();
        assert!(text.starts_with("Your cart is empty"));
        assert!(text.contains("p-1"));
    }

    #[tokio::test]
    async fn test_empty_cart_json_stays_valid() {
        let backend = MockBackend::start().await;
        let state = signed_in(&backend, "tok-user").await;

        let err = AppError::new(ErrorCode::CartEmpty, "Cart is empty");
        let text = handle_outcome(&state, true, Err(err)).await.unwrap().unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["cartEmpty"], true);
        assert!(!value["products"]["content"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_token_clears_session() {
        let backend = MockBackend::start().await;
        let state = signed_in(&backend, "tok-revoked").await;

        let result = commands::account::whoami(&state).await.map(|_| ());
        let err = handle_outcome(&state, false, result).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert!(err.message.contains("storefront login"));
        assert!(state.db.inner().session().token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let backend = MockBackend::start().await;
        let state = state_for(&backend).await;

        let err = handle_outcome(&state, false, Err(AppError::not_found("Order", "ord-9")))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(handle_outcome(&state, false, Ok(())).await.unwrap().is_none());
    }
}
