//! Cart route handlers.
//!
//! The cart lives in the session; every mutation loads it, applies the
//! change through `canteen_core::Cart`, and saves it back. Prices shown here
//! are snapshots taken when the item was added.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use canteen_core::{Cart, CartEntry, ItemId, ItemSnapshot};

use crate::db::{CatalogRepository, RepositoryError, settings};
use crate::error::{AppError, Result};
use crate::middleware::session_state;
use crate::state::AppState;

/// One cart line as clients see it.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub item: ItemSnapshot,
    pub qty: u32,
    pub line_total: Decimal,
}

impl From<&CartEntry> for CartLineView {
    fn from(entry: &CartEntry) -> Self {
        Self {
            item: entry.item.clone(),
            qty: entry.qty,
            line_total: entry.line_total(),
        }
    }
}

/// Cart display data.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub subtotal: Decimal,
    pub service_charge: Decimal,
    pub total: Decimal,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.entries().map(Into::into).collect(),
            subtotal: cart.subtotal(),
            service_charge: cart.service_charge(),
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub item_id: ItemId,
    pub qty: Option<u32>,
}

/// Quantity adjustment request. Positive adds, negative removes; a line
/// whose quantity drops to zero disappears.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub item_id: ItemId,
    pub delta: i64,
}

/// Remove from cart request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub item_id: ItemId,
}

/// Cart count badge payload.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// GET /cart - the current cart with totals.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<CartView> {
    let cart = session_state::load_cart(&session).await;
    Json(CartView::from(&cart))
}

/// Look up an item and refuse unorderable ones.
async fn orderable_snapshot(state: &AppState, item_id: ItemId) -> Result<ItemSnapshot> {
    if !settings::receive_orders(state.pool()).await? {
        return Err(AppError::OrderingPaused);
    }

    let repo = CatalogRepository::new(state.pool());
    let item = match repo.get_item(item_id).await {
        Ok(item) => item,
        Err(RepositoryError::NotFound) => {
            return Err(AppError::NotFound(format!("item {item_id}")));
        }
        Err(e) => return Err(e.into()),
    };

    if !item.is_available {
        return Err(AppError::BadRequest(format!(
            "{} is currently unavailable",
            item.name
        )));
    }

    Ok(item.snapshot())
}

/// POST /cart/add - add an item (default quantity 1).
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let snapshot = orderable_snapshot(&state, request.item_id).await?;

    let mut cart = session_state::load_cart(&session).await;
    cart.update_quantity(&snapshot, i64::from(request.qty.unwrap_or(1)));
    session_state::save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// POST /cart/update - adjust a line's quantity by a delta.
///
/// Decrements reuse the snapshot already in the cart; increments of items
/// not yet in the cart go through the catalog so availability is enforced.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = session_state::load_cart(&session).await;

    let snapshot = match cart.entries().find(|e| e.item.id == request.item_id) {
        Some(entry) => entry.item.clone(),
        None if request.delta > 0 => orderable_snapshot(&state, request.item_id).await?,
        None => {
            // Decrementing an absent line is a no-op, mirroring the cart map.
            return Ok(Json(CartView::from(&cart)));
        }
    };

    cart.update_quantity(&snapshot, request.delta);
    session_state::save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// POST /cart/remove - drop a line entirely.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = session_state::load_cart(&session).await;
    cart.remove(request.item_id);
    session_state::save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// GET /cart/count - unit count for the cart badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Json<CartCount> {
    let cart = session_state::load_cart(&session).await;
    Json(CartCount {
        count: cart.item_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_view_totals() {
        let mut cart = Cart::new();
        cart.update_quantity(
            &ItemSnapshot {
                id: ItemId::new(1),
                name: "Item A".to_string(),
                price: Decimal::from(100),
                image_url: None,
            },
            2,
        );
        cart.update_quantity(
            &ItemSnapshot {
                id: ItemId::new(2),
                name: "Item B".to_string(),
                price: Decimal::from(50),
                image_url: None,
            },
            1,
        );

        let view = CartView::from(&cart);
        assert_eq!(view.subtotal, Decimal::from(250));
        assert_eq!(view.service_charge, Decimal::new(125, 1));
        assert_eq!(view.total, Decimal::new(2625, 1));
        assert_eq!(view.item_count, 3);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items.first().map(|l| l.line_total), Some(Decimal::from(200)));
    }
}
