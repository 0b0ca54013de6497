//! The session-state boundary: cart and in-flight order marker.
//!
//! All per-user mutable state lives in the session and is best-effort on
//! read: corrupt or missing values deserialize to their defaults instead of
//! failing the request. Writes are explicit - callers persist the cart after
//! every change.

use tower_sessions::Session;

use canteen_core::{Cart, GatewayOrderId};

use crate::models::session_keys;

/// Load the cart from the session.
///
/// Missing or corrupt stored data yields an empty cart rather than an error.
pub async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(Some(cart)) => cart,
        Ok(None) => Cart::new(),
        Err(e) => {
            tracing::warn!("discarding unreadable cart from session: {e}");
            Cart::new()
        }
    }
}

/// Persist the cart to the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(
    session: &Session,
    cart: &Cart,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Drop the cart from the session (successful checkout, logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_cart(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<Cart>(session_keys::CART).await?;
    Ok(())
}

/// The gateway order currently awaiting webhook-confirmed completion, if any.
///
/// Like the cart, unreadable data reads as "nothing in flight".
pub async fn inflight_order(session: &Session) -> Option<GatewayOrderId> {
    session
        .get::<GatewayOrderId>(session_keys::INFLIGHT_ORDER_ID)
        .await
        .ok()
        .flatten()
}

/// Record the gateway order id as in-flight.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_inflight_order(
    session: &Session,
    order_id: &GatewayOrderId,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::INFLIGHT_ORDER_ID, order_id)
        .await
}

/// Clear the in-flight marker (reconciled, or logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_inflight_order(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<GatewayOrderId>(session_keys::INFLIGHT_ORDER_ID)
        .await?;
    Ok(())
}
