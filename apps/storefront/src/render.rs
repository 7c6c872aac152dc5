//! # Terminal Output
//!
//! Turns command results into text for stdout. Logs go to stderr, so
//! output can be piped; `--json` prints the raw value instead.
//!
//! ```text
//! ╭──────┬───────────────────┬─────┬────────────┬────────┬──────────╮
//! │ ID   │ Item              │ Qty │ Type       │ Points │    Price │
//! ├──────┼───────────────────┼─────┼────────────┼────────┼──────────┤
//! │ p-1  │ Basmati Rice 5kg  │   1 │ PARTIAL_EP │ 370 EP │ ₹1000.00 │
//! ╰──────┴───────────────────┴─────┴────────────┴────────┴──────────╯
//! ```

use serde::Serialize;
use serde_json::Value;
use tabled::{
    builder::Builder,
    settings::{
        object::{Columns, Rows},
        Alignment, Color, Style,
    },
    Table,
};

use storefront_api::{CheckoutOutcome, Metrics};
use storefront_core::{
    Address, CartSummary, CartView, Category, LoyaltyCardApplication, Order, Page, Product, Store,
    SummarySource, User,
};

use crate::commands::catalog::ProductDetails;
use crate::error::{AppError, AppResult};
use crate::state::ConfigState;

/// Prints `value` as JSON, or the text `render` produces.
pub fn emit<T: Serialize>(json: bool, value: &T, render: impl FnOnce() -> String) -> AppResult<()> {
    println!("{}", output(json, value, render)?);
    Ok(())
}

/// What [`emit`] prints.
pub fn output<T: Serialize>(
    json: bool,
    value: &T,
    render: impl FnOnce() -> String,
) -> AppResult<String> {
    if json {
        serde_json::to_string_pretty(value)
            .map_err(|e| AppError::internal(format!("Could not encode output: {}", e)))
    } else {
        Ok(render())
    }
}

fn finish(builder: Builder, numeric_from: usize) -> Table {
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(numeric_from..), Alignment::right());
    table
}

fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

// =============================================================================
// Account
// =============================================================================

pub fn user(user: Option<&User>) -> String {
    let Some(user) = user else {
        return "Not signed in (guest mode)".to_string();
    };

    let mut lines = vec![
        format!("{} <{}>", user.name, user.email),
        format!("Role:        {:?}", user.role),
    ];
    if user.card_holder {
        lines.push(format!("Loyalty card: yes, balance {}", user.e_points));
    } else {
        lines.push("Loyalty card: no (storefront loyalty apply)".to_string());
    }
    lines.join("\n")
}

// =============================================================================
// Catalog
// =============================================================================

pub fn products(page: &Page<Product>, config: &ConfigState) -> String {
    if page.content.is_empty() {
        return "No products found".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Brand", "Category", "Stock", "Price"]);
    for product in &page.content {
        builder.push_record([
            product.id.clone(),
            product.name.clone(),
            or_dash(product.brand.as_deref()),
            or_dash(product.category.as_deref()),
            if product.in_stock { "yes" } else { "no" }.to_string(),
            price_cell(product, config),
        ]);
    }

    format!(
        "{}\nPage {} of {} ({} products)",
        finish(builder, 5),
        page.page + 1,
        page.total_pages.max(1),
        page.total_elements
    )
}

fn price_cell(product: &Product, config: &ConfigState) -> String {
    let price = storefront_core::pricing::effective_price(product);
    if product.has_discount() {
        format!(
            "{} (-{}%)",
            config.format_currency(price),
            product.discount().percentage()
        )
    } else {
        config.format_currency(price)
    }
}

pub fn product(details: &ProductDetails, config: &ConfigState) -> String {
    let product = &details.product;
    let mut out = format!("{}\n", product.name);

    if let Some(brand) = &product.brand {
        out.push_str(&format!("Brand:    {}\n", brand));
    }
    if product.has_discount() {
        out.push_str(&format!(
            "Price:    {} (was {}, {}% off)\n",
            config.format_currency(details.price),
            config.format_currency(product.normal_price),
            product.discount().percentage()
        ));
    } else {
        out.push_str(&format!("Price:    {}\n", config.format_currency(details.price)));
    }
    out.push_str(&format!(
        "Stock:    {}\n",
        if product.in_stock { "in stock" } else { "out of stock" }
    ));
    out.push_str(&format!("Earns:    ~{} on a cash purchase\n", details.points_earned));
    if let Some(description) = &product.description {
        out.push_str(&format!("\n{}\n", description));
    }

    if let Some(options) = &details.options {
        let mut builder = Builder::default();
        builder.push_record(["Purchase type", "Cash", "e-Points"]);
        for quote in options.iter() {
            builder.push_record([
                quote.purchase_type.to_string(),
                config.format_currency(quote.cash),
                quote.points.to_string(),
            ]);
        }
        out.push_str(&format!("\n{}", finish(builder, 1)));
    }
    out
}

pub fn categories(categories: &[Category]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Name"]);
    for category in categories {
        builder.push_record([category.id.clone(), category.name.clone()]);
    }
    finish(builder, 2).to_string()
}

// =============================================================================
// Cart & Orders
// =============================================================================

pub fn cart(view: &CartView, config: &ConfigState) -> String {
    if view.is_empty() {
        return "Your cart is empty".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Item", "Qty", "Type", "Points", "Price"]);
    for item in &view.items {
        builder.push_record([
            item.product_id.clone(),
            item.product_name.clone(),
            item.quantity.to_string(),
            item.purchase_type.to_string(),
            item.points_used.to_string(),
            config.format_currency(item.price),
        ]);
    }

    let mut out = format!("{}\n{}", finish(builder, 2), summary(&view.summary, config));
    if view.source == SummarySource::Guest {
        out.push_str("\nGuest cart: sign in to pay with e-points and check out");
    }
    out
}

fn summary(summary: &CartSummary, config: &ConfigState) -> String {
    let mut builder = Builder::default();
    builder.push_record(["MRP total".to_string(), config.format_currency(summary.mrp_total)]);
    if !summary.e_points_discount.is_zero() {
        builder.push_record([
            "e-Points discount".to_string(),
            format!("-{}", config.format_currency(summary.e_points_discount)),
        ]);
    }
    if !summary.coupon_discount.is_zero() {
        builder.push_record([
            "Coupon discount".to_string(),
            format!("-{}", config.format_currency(summary.coupon_discount)),
        ]);
    }
    builder.push_record(["Platform fee".to_string(), config.format_currency(summary.platform_fee)]);
    builder.push_record(["Total payable".to_string(), config.format_currency(summary.total_payable)]);
    if !summary.points_used.is_zero() {
        builder.push_record(["Points used".to_string(), summary.points_used.to_string()]);
    }
    if !summary.points_earned.is_zero() {
        builder.push_record(["Points earned".to_string(), summary.points_earned.to_string()]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

pub fn orders(orders: &[Order], config: &ConfigState) -> String {
    if orders.is_empty() {
        return "No orders yet".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Status", "Payment", "Placed", "Items", "Total"]);
    for order in orders {
        builder.push_record([
            order.id.clone(),
            order.status.to_string(),
            format!("{:?}", order.payment_method),
            order
                .created_at
                .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string()),
            order.items.iter().map(|i| i.quantity).sum::<i64>().to_string(),
            config.format_currency(order.summary.total_payable),
        ]);
    }
    finish(builder, 4).to_string()
}

pub fn order(order: &Order, config: &ConfigState) -> String {
    let mut out = format!("Order {}  [{}]\n", order.id, order.status);
    if let Some(at) = order.created_at {
        out.push_str(&format!("Placed:   {}\n", at.format("%Y-%m-%d %H:%M UTC")));
    }
    out.push_str(&format!("Payment:  {:?}\n", order.payment_method));
    if let Some(store) = &order.store_id {
        out.push_str(&format!("Pickup:   store {}\n", store));
    }
    if let Some(address) = &order.address_id {
        out.push_str(&format!("Deliver:  address {}\n", address));
    }

    let view = CartView {
        items: order.items.clone(),
        summary: order.summary.clone(),
        source: SummarySource::Backend,
    };
    if !view.is_empty() {
        out.push_str(&cart(&view, config));
    }
    out
}

pub fn checkout(outcome: &CheckoutOutcome, config: &ConfigState) -> String {
    match outcome {
        CheckoutOutcome::Placed { order: placed, .. } => format!(
            "Order placed, pay {} on delivery\n{}",
            config.format_currency(placed.summary.total_payable),
            order(placed, config)
        ),
        CheckoutOutcome::Paid { order: paid, .. } => {
            format!("Payment verified, thank you!\n{}", order(paid, config))
        }
        CheckoutOutcome::Dismissed { order_id } => format!(
            "Payment not completed. Order {} is waiting for payment:\n  \
             storefront pay {} --payment-id <id> --signature <sig>",
            order_id, order_id
        ),
    }
}

// =============================================================================
// Account data
// =============================================================================

pub fn addresses(addresses: &[Address]) -> String {
    if addresses.is_empty() {
        return "No saved addresses".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Label", "Address", "Phone", "Default"]);
    for address in addresses {
        builder.push_record([
            or_dash(address.id.as_deref()),
            or_dash(address.label.as_deref()),
            address.to_string(),
            address.phone.clone(),
            if address.is_default { "*" } else { "" }.to_string(),
        ]);
    }
    finish(builder, 5).to_string()
}

pub fn stores(stores: &[Store]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "City", "Address", "Phone"]);
    for store in stores {
        builder.push_record([
            store.id.clone(),
            store.name.clone(),
            store.city.clone(),
            or_dash(store.address.as_deref()),
            or_dash(store.phone.as_deref()),
        ]);
    }
    finish(builder, 5).to_string()
}

pub fn loyalty(application: Option<&LoyaltyCardApplication>) -> String {
    let Some(application) = application else {
        return "No loyalty card application (storefront loyalty apply)".to_string();
    };

    let mut out = format!("Application: {:?}", application.status);
    if let Some(at) = application.applied_at {
        out.push_str(&format!("\nApplied:     {}", at.format("%Y-%m-%d")));
    }
    if let Some(card) = &application.card_number {
        out.push_str(&format!("\nCard:        {}", card));
    }
    out
}

pub fn metrics(metrics: &Metrics) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Metric", "Value"]);
    builder.push_record(["health".to_string(), metrics.health.status.clone()]);
    for (name, value) in &metrics.values {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        builder.push_record([name.clone(), value]);
    }
    finish(builder, 1).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{CartItem, Money, Points, PurchaseType};

    fn line(id: &str, qty: i64, price: Money) -> CartItem {
        CartItem {
            product_id: id.to_string(),
            product_name: format!("Product {}", id),
            brand: None,
            image_url: None,
            quantity: qty,
            purchase_type: PurchaseType::Normal,
            points_used: Points::zero(),
            price,
        }
    }

    #[test]
    fn test_empty_cart() {
        let view = CartView {
            items: Vec::new(),
            summary: CartSummary::default(),
            source: SummarySource::Guest,
        };
        assert_eq!(cart(&view, &ConfigState::default()), "Your cart is empty");
    }

    #[test]
    fn test_guest_cart_hides_zero_discount() {
        let view = CartView {
            items: vec![line("p-1", 2, Money::from_major(2000))],
            summary: CartSummary {
                mrp_total: Money::from_major(2000),
                platform_fee: Money::from_major(20),
                total_payable: Money::from_major(2020),
                ..Default::default()
            },
            source: SummarySource::Guest,
        };

        let text = cart(&view, &ConfigState::default());
        assert!(text.contains("₹2020.00"));
        assert!(!text.contains("e-Points discount"));
        assert!(text.contains("Guest cart"));
    }

    #[test]
    fn test_dismissed_checkout_explains_next_step() {
        let text = checkout(
            &CheckoutOutcome::Dismissed {
                order_id: "ord-7".to_string(),
            },
            &ConfigState::default(),
        );
        assert!(text.contains("storefront pay ord-7"));
    }

    #[test]
    fn test_guest_user() {
        assert_eq!(user(None), "Not signed in (guest mode)");
    }
}
