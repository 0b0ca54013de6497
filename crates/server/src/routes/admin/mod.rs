//! Staff admin routes.
//!
//! Direct catalog and order mutations plus the store-wide ordering toggle.
//! Every handler requires a staff session. These are low-frequency,
//! single-operator actions; last write wins.

pub mod items;
pub mod orders;
pub mod settings;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the admin routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/items", get(items::list).post(items::create))
        .route("/items/{id}", put(items::update).delete(items::delete))
        .route("/categories", post(items::create_category))
        .route(
            "/categories/{id}",
            put(items::update_category).delete(items::delete_category),
        )
        // Orders
        .route("/orders", get(orders::list))
        .route("/orders/stats", get(orders::stats))
        .route("/orders/{id}/status", put(orders::update_status))
        // Settings
        .route("/settings", get(settings::show))
        .route("/settings/receive-orders", put(settings::set_receive_orders))
}
