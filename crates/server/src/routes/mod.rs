//! HTTP route handlers for the canteen service.
//!
//! Every route speaks JSON; presentational rendering happens in clients.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (DB probe)
//!
//! # Menu
//! GET  /menu                    - Categories + items with availability labels
//! GET  /menu/items              - Item search (?category=, ?q=)
//!
//! # Auth
//! POST /auth/login              - Install a verified OAuth profile in the session
//! POST /auth/logout             - Clear user, cart, and in-flight marker
//! GET  /auth/me                 - Current session identity
//!
//! # Cart (session-backed)
//! GET  /cart                    - Cart with subtotal, service charge, total
//! POST /cart/add                - Add an item ({item_id, qty?})
//! POST /cart/update             - Adjust a quantity ({item_id, delta})
//! POST /cart/remove             - Remove a line ({item_id})
//! GET  /cart/count              - Unit count badge
//!
//! # Checkout
//! POST /checkout                - Create a gateway order, mark it in-flight
//! POST /checkout/reconcile      - Poll for the webhook-written order (2s x 60s)
//! GET  /checkout/status         - In-flight marker + single recorded probe
//! POST /checkout/cancel         - Abandon the attempt (marker cleared, cart kept)
//! POST /checkout/verify         - Read payment status from the gateway
//!
//! # Orders
//! GET  /orders                  - Current user's orders (clients re-poll)
//!
//! # Webhooks (gateway-facing)
//! POST /webhooks/gateway        - HMAC-verified payment events
//!
//! # Admin (staff only)
//! GET  /admin/items             - Full catalog including unavailable items
//! POST /admin/items             - Create item
//! PUT  /admin/items/{id}        - Update item
//! DELETE /admin/items/{id}      - Delete item
//! POST /admin/categories        - Create category
//! PUT  /admin/categories/{id}   - Update category
//! DELETE /admin/categories/{id} - Delete category
//! GET  /admin/orders            - All orders
//! GET  /admin/orders/stats      - Today's performance numbers
//! PUT  /admin/orders/{id}/status - Status transition
//! GET  /admin/settings          - Global settings
//! PUT  /admin/settings/receive-orders - Toggle ordering (off pauses all items)
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod menu;
pub mod orders;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the menu routes router.
pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(menu::show))
        .route("/items", get(menu::items))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::begin))
        .route("/reconcile", post(checkout::reconcile))
        .route("/status", get(checkout::status))
        .route("/cancel", post(checkout::cancel))
        .route("/verify", post(checkout::verify))
}

/// Create all routes for the canteen service.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Menu
        .nest("/menu", menu_routes())
        // Auth
        .nest("/auth", auth_routes())
        // Cart
        .nest("/cart", cart_routes())
        // Checkout
        .nest("/checkout", checkout_routes())
        // Order history
        .route("/orders", get(orders::index))
        // Gateway webhook
        .route("/webhooks/gateway", post(webhooks::gateway))
        // Staff admin
        .nest("/admin", admin::routes())
}
