//! # Domain Types
//!
//! Core domain types shared by every layer of the storefront.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartItem     │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  product_id     │   │  id             │       │
//! │  │  normal_price   │   │  quantity       │   │  card_holder    │       │
//! │  │  discount %     │   │  purchase_type  │   │  e_points       │       │
//! │  │  brand, image   │   │  points_used    │   │  role           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  PurchaseType   │   │  CartSummary    │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  NORMAL         │   │  mrp_total      │   │  id, status     │       │
//! │  │  PARTIAL_EP     │   │  e_points_disc  │   │  items          │       │
//! │  │  FULL_EP        │   │  platform_fee   │   │  summary        │       │
//! │  └─────────────────┘   │  total_payable  │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Compatibility
//! Every type here mirrors a backend JSON payload (camelCase). Summary
//! fields default to zero when the backend omits them, so an empty cart
//! deserializes from `{}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::{DiscountRate, Money, Points};

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Brand shown on the product card.
    #[serde(default)]
    pub brand: Option<String>,

    /// Price before any discount.
    #[serde(alias = "price")]
    pub normal_price: Money,

    /// Optional discount percent (e.g. `10.0` = 10% off).
    #[serde(default)]
    pub discount_percent: Option<f64>,

    /// Image reference (URL or path).
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,

    /// Category name, when the backend includes it.
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Stock availability flag.
    #[serde(default = "default_true")]
    pub in_stock: bool,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Returns the discount as a rate.
    #[inline]
    pub fn discount(&self) -> DiscountRate {
        self.discount_percent
            .map(DiscountRate::from_percentage)
            .unwrap_or_default()
    }

    /// Whether a discount is currently active on this product.
    ///
    /// Reads the raw percentage: a discount too small to survive rounding
    /// to basis points still counts as a discount.
    #[inline]
    pub fn has_discount(&self) -> bool {
        self.discount_percent
            .is_some_and(|pct| pct.is_finite() && pct > 0.0)
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default, alias = "number")]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Whether another page follows this one.
    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }
}

// =============================================================================
// Purchase Type
// =============================================================================

/// How a line item is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseType {
    /// All cash.
    #[default]
    Normal,
    /// 37% of the price in e-points, the rest in cash.
    #[serde(rename = "PARTIAL_EP")]
    PartialEp,
    /// The whole price in e-points.
    #[serde(rename = "FULL_EP")]
    FullEp,
}

impl PurchaseType {
    /// Whether this purchase type spends e-points.
    pub fn uses_points(&self) -> bool {
        !matches!(self, PurchaseType::Normal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseType::Normal => "NORMAL",
            PurchaseType::PartialEp => "PARTIAL_EP",
            PurchaseType::FullEp => "FULL_EP",
        }
    }
}

impl fmt::Display for PurchaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PurchaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "NORMAL" => Ok(PurchaseType::Normal),
            "PARTIAL_EP" | "PARTIAL" => Ok(PurchaseType::PartialEp),
            "FULL_EP" | "FULL" => Ok(PurchaseType::FullEp),
            other => Err(format!("unknown purchase type '{}'", other)),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    #[serde(alias = "ROLE_USER")]
    User,
    #[serde(alias = "ROLE_ADMIN")]
    Admin,
}

/// The signed-in customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Loyalty card membership. Gates redemption options.
    #[serde(default, alias = "hasLoyaltyCard")]
    pub card_holder: bool,
    /// Current e-points balance.
    #[serde(default, rename = "ePoints", alias = "epoints")]
    pub e_points: Points,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A line in the backend cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub purchase_type: PurchaseType,
    /// Points spent on this line (all units).
    #[serde(default)]
    pub points_used: Points,
    /// Cash price of the line as computed by the backend.
    #[serde(default)]
    pub price: Money,
}

/// Aggregate figures shown in cart and checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartSummary {
    /// Sum of line prices before any e-points or coupon discount.
    pub mrp_total: Money,
    /// Cash value of the e-points applied.
    #[serde(rename = "ePointsDiscount", alias = "epointsDiscount")]
    pub e_points_discount: Money,
    pub coupon_discount: Money,
    pub platform_fee: Money,
    /// Final amount the customer pays in cash.
    #[serde(alias = "finalAmount", alias = "total")]
    pub total_payable: Money,
    pub points_used: Points,
    pub points_earned: Points,
    pub points_available: Points,
}

/// The backend cart: lines plus summary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub summary: CartSummary,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Addresses & Stores
// =============================================================================

/// A delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.line1)?;
        if let Some(line2) = self.line2.as_deref().filter(|l| !l.is_empty()) {
            write!(f, ", {}", line2)?;
        }
        write!(f, ", {}, {} {}", self.city, self.state, self.pincode)
    }
}

/// A physical store (pickup location).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

// =============================================================================
// Orders
// =============================================================================

/// Lifecycle of an order on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    PendingPayment,
    Placed,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "PENDING_PAYMENT",
            OrderStatus::Placed => "PLACED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Whether the customer may still cancel.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            OrderStatus::PendingPayment | OrderStatus::Placed | OrderStatus::Confirmed
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "PENDING_PAYMENT" => Ok(OrderStatus::PendingPayment),
            "PLACED" => Ok(OrderStatus::Placed),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status '{}'", other)),
        }
    }
}

/// How the order is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Third-party checkout widget.
    #[default]
    Online,
    CashOnDelivery,
}

/// An order as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub summary: CartSummary,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub address_id: Option<String>,
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Loyalty Card
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

/// A loyalty card application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyCardApplication {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub card_number: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_backend_json() {
        let json = r#"{
            "id": "p-1",
            "name": "Basmati Rice 5kg",
            "brand": "India Gate",
            "normalPrice": 500,
            "discountPercent": 10,
            "imageUrl": "/img/rice.png"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.normal_price, Money::from_major(500));
        assert!(product.has_discount());
        assert_eq!(product.discount().bps(), 1000);
        assert!(product.in_stock);
    }

    #[test]
    fn test_product_without_discount() {
        let json = r#"{"id":"p-2","name":"Tea","price":1000.0,"discountPercent":0}"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert!(!product.has_discount());
        assert_eq!(product.normal_price.minor(), 100_000);
    }

    #[test]
    fn test_purchase_type_wire_names() {
        assert_eq!(serde_json::to_string(&PurchaseType::PartialEp).unwrap(), "\"PARTIAL_EP\"");
        assert_eq!(serde_json::to_string(&PurchaseType::FullEp).unwrap(), "\"FULL_EP\"");
        let parsed: PurchaseType = serde_json::from_str("\"NORMAL\"").unwrap();
        assert_eq!(parsed, PurchaseType::Normal);
    }

    #[test]
    fn test_purchase_type_from_str() {
        assert_eq!("partial".parse::<PurchaseType>().unwrap(), PurchaseType::PartialEp);
        assert_eq!("full-ep".parse::<PurchaseType>().unwrap(), PurchaseType::FullEp);
        assert!("half".parse::<PurchaseType>().is_err());
    }

    #[test]
    fn test_user_role_aliases() {
        let json = r#"{"id":"u1","name":"Asha","email":"a@x.in","cardHolder":true,"ePoints":250,"role":"ROLE_ADMIN"}"#;
        let user: User = serde_json::from_str(json).unwrap();

        assert!(user.card_holder);
        assert_eq!(user.e_points, Points::new(250));
        assert!(user.is_admin());
    }

    #[test]
    fn test_empty_cart_deserializes() {
        let cart: Cart = serde_json::from_str("{}").unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.summary, CartSummary::default());
    }

    #[test]
    fn test_order_status_cancellable() {
        assert!(OrderStatus::Placed.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert_eq!("delivered".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
    }

    #[test]
    fn test_address_display() {
        let address = Address {
            id: None,
            label: Some("Home".to_string()),
            line1: "12 MG Road".to_string(),
            line2: None,
            city: "Pune".to_string(),
            state: "MH".to_string(),
            pincode: "411001".to_string(),
            phone: "9876543210".to_string(),
            is_default: true,
        };
        assert_eq!(address.to_string(), "12 MG Road, Pune, MH 411001");
    }

    #[test]
    fn test_page_has_next() {
        let page: Page<Category> = Page {
            content: vec![],
            page: 0,
            size: 20,
            total_elements: 45,
            total_pages: 3,
        };
        assert!(page.has_next());
    }
}
