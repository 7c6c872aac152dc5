//! # Endpoints
//!
//! Each file adds an `impl ApiClient` block for one area of the backend.
//!
//! | Module      | Paths                                              |
//! |-------------|----------------------------------------------------|
//! | [`auth`]    | `/api/auth/login`, `/api/auth/register`, `/me`     |
//! | [`catalog`] | `/api/products`, `/api/categories`                 |
//! | [`cart`]    | `/api/cart`, `/api/cart/items/{productId}`         |
//! | [`orders`]  | `/api/orders`, `/api/payments/verify`              |
//! | [`account`] | `/api/addresses`, `/api/stores`, `/api/loyalty/*`  |
//! | [`admin`]   | `/api/admin/*`, `/actuator/health`                 |

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
