//! Campus Canteen Core - Shared types library.
//!
//! This crate provides common types used across all Campus Canteen components:
//! - `server` - Ordering web service (menu, cart, checkout, admin)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and domain logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, and statuses
//! - [`cart`] - The shopping cart model and its pricing rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::*;
pub use types::*;
