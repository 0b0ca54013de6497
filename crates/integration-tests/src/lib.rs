//! Cross-crate tests for Campus Canteen.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p canteen-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Checkout preconditions and reconciliation contract
//! - `webhook_recording` - Webhook signature and payload handling
//! - `cart_session` - Cart model behavior across serialization boundaries
//!
//! Tests here are logical: they exercise the public API of the core and
//! server crates without a live database or gateway. Anything needing
//! `PostgreSQL` stays in per-crate tests guarded by a configured
//! `DATABASE_URL`.
