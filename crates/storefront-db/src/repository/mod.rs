//! # Repository Module
//!
//! ```text
//! Database
//! ├── session()     → SessionRepository    (save / load / clear)
//! └── guest_cart()  → GuestCartRepository  (load / save / clear)
//! ```
//!
//! Both repositories store whole values: a save replaces what was there.

pub mod guest_cart;
pub mod session;
