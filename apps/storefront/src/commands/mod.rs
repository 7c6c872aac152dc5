//! # Commands Module
//!
//! One function per CLI action. Each takes `&AppState`, returns data and
//! never prints; rendering lives in [`crate::render`].
//!
//! ```text
//! cli.rs (clap) ──► lib.rs dispatch ──► commands::* ──► render::*
//!                                          │
//!                            storefront-api / storefront-db / core
//! ```
//!
//! ## Command Categories
//! - `account`: login, register, logout, whoami
//! - `catalog`: product listing, details with redemption options
//! - `cart`: signed-in (backend) or guest (local) cart
//! - `checkout`: order placement, payment, order history
//! - `addresses`: delivery addresses and pickup stores
//! - `loyalty`: loyalty card application
//! - `admin`: order management and metrics

pub mod account;
pub mod addresses;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod loyalty;
