//! Command line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use storefront_core::{OrderStatus, PaymentMethod, PurchaseType};

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront: catalog, cart and e-points checkout", long_about = None)]
pub struct Cli {
    /// Config file (default: storefront.toml in the platform config directory)
    #[arg(long, global = true, env = "STOREFRONT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in
    Login(LoginArgs),
    /// Create an account and sign in
    Register(RegisterArgs),
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,

    /// List or search products
    Products(ProductsArgs),
    /// Product details with e-points options
    Product {
        id: String,
    },
    Categories,

    Cart(CartCommand),

    /// Place an order for the signed-in cart
    Checkout(CheckoutArgs),
    /// Confirm payment for an order awaiting it
    Pay(PayArgs),
    Orders,
    Order {
        id: String,
    },
    /// Cancel an order that has not shipped
    Cancel {
        id: String,
    },

    Addresses(AddressesCommand),
    /// Pickup stores
    Stores,
    Loyalty(LoyaltyCommand),
    Admin(AdminCommand),
}

// =============================================================================
// Account
// =============================================================================

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// 10-digit mobile number
    #[arg(long)]
    pub phone: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Args)]
pub struct ProductsArgs {
    /// Search text
    #[arg(long, short)]
    pub q: Option<String>,

    /// Category id
    #[arg(long)]
    pub category: Option<String>,

    /// Zero-based page
    #[arg(long, default_value_t = 0)]
    pub page: u32,

    #[arg(long, default_value_t = 20)]
    pub size: u32,
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Args)]
pub struct CartCommand {
    #[command(subcommand)]
    pub command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum CartSubcommand {
    Show,
    Add {
        product_id: String,

        #[arg(long, default_value_t = 1)]
        qty: i64,

        /// normal, partial or full
        #[arg(long = "type", default_value = "normal")]
        purchase_type: PurchaseType,
    },
    /// Set a line's quantity (0 removes it)
    Update {
        product_id: String,
        qty: i64,
    },
    Remove {
        product_id: String,
    },
    Clear,
}

// =============================================================================
// Checkout & Orders
// =============================================================================

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Pay cash on delivery
    #[arg(long)]
    pub cod: bool,

    /// Delivery address id
    #[arg(long, conflicts_with = "store")]
    pub address: Option<String>,

    /// Pickup store id
    #[arg(long)]
    pub store: Option<String>,

    /// Gateway payment id, when already paid
    #[arg(long, conflicts_with = "cod")]
    pub payment_id: Option<String>,

    /// Gateway signature, when already paid
    #[arg(long, conflicts_with = "cod")]
    pub signature: Option<String>,

    /// Key printed by an interrupted checkout; reuses its order
    #[arg(long)]
    pub idempotency_key: Option<String>,
}

impl CheckoutArgs {
    pub fn payment_method(&self) -> PaymentMethod {
        if self.cod {
            PaymentMethod::CashOnDelivery
        } else {
            PaymentMethod::Online
        }
    }
}

#[derive(Debug, Args)]
pub struct PayArgs {
    pub order_id: String,

    #[arg(long)]
    pub payment_id: String,

    #[arg(long)]
    pub signature: String,
}

// =============================================================================
// Addresses & Loyalty
// =============================================================================

#[derive(Debug, Args)]
pub struct AddressesCommand {
    #[command(subcommand)]
    pub command: AddressesSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum AddressesSubcommand {
    List,
    Add(AddressArgs),
    Remove { id: String },
}

#[derive(Debug, Args)]
pub struct AddressArgs {
    /// e.g. Home, Office
    #[arg(long)]
    pub label: Option<String>,

    #[arg(long)]
    pub line1: String,

    #[arg(long)]
    pub line2: Option<String>,

    #[arg(long)]
    pub city: String,

    #[arg(long)]
    pub state: String,

    #[arg(long)]
    pub pincode: String,

    #[arg(long)]
    pub phone: String,

    /// Make this the default address
    #[arg(long)]
    pub default: bool,
}

#[derive(Debug, Args)]
pub struct LoyaltyCommand {
    #[command(subcommand)]
    pub command: LoyaltySubcommand,
}

#[derive(Debug, Subcommand)]
pub enum LoyaltySubcommand {
    /// Apply for the loyalty card
    Apply,
    Status,
}

// =============================================================================
// Admin
// =============================================================================

#[derive(Debug, Args)]
pub struct AdminCommand {
    #[command(subcommand)]
    pub command: AdminSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum AdminSubcommand {
    /// All orders, optionally by status
    Orders {
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    SetStatus {
        order_id: String,
        status: OrderStatus,
    },
    /// Backend metrics and health
    Metrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cart_add_parses_purchase_type() {
        let cli = Cli::parse_from(["storefront", "cart", "add", "p-1", "--qty", "2", "--type", "partial"]);
        let Commands::Cart(CartCommand {
            command: CartSubcommand::Add {
                qty, purchase_type, ..
            },
        }) = cli.command
        else {
            panic!("expected cart add");
        };
        assert_eq!(qty, 2);
        assert_eq!(purchase_type, PurchaseType::PartialEp);
    }

    #[test]
    fn test_admin_status_parses() {
        let cli = Cli::parse_from(["storefront", "admin", "set-status", "ord-1", "shipped"]);
        assert!(matches!(
            cli.command,
            Commands::Admin(AdminCommand {
                command: AdminSubcommand::SetStatus {
                    status: OrderStatus::Shipped,
                    ..
                }
            })
        ));
    }

    #[test]
    fn test_checkout_idempotency_key_parses() {
        let cli = Cli::parse_from(["storefront", "checkout", "--idempotency-key", "chk-1"]);
        let Commands::Checkout(args) = cli.command else {
            panic!("expected checkout");
        };
        assert_eq!(args.idempotency_key.as_deref(), Some("chk-1"));
    }

    #[test]
    fn test_cod_conflicts_with_payment_id() {
        let result = Cli::try_parse_from([
            "storefront",
            "checkout",
            "--cod",
            "--payment-id",
            "pay_1",
        ]);
        assert!(result.is_err());
    }
}
