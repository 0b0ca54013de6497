//! Order-history route handlers.
//!
//! Read-only views over webhook-recorded orders. Clients re-poll on a fixed
//! cadence; the response advertises it so the interval lives in one place.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use canteen_core::OrderStatus;

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderLine};
use crate::state::AppState;

/// How often clients should re-fetch order lists, in seconds.
pub const ORDERS_POLL_SECONDS: u64 = 10;

/// One order as clients see it.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: String,
    /// Short form for receipts and status chips.
    pub short_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderLineView>,
    pub total: Decimal,
}

/// One order line as clients see it.
#[derive(Debug, Serialize)]
pub struct OrderLineView {
    pub name: String,
    pub image_url: Option<String>,
    pub qty: u32,
    pub price: Decimal,
    pub line_total: Decimal,
}

impl From<&OrderLine> for OrderLineView {
    fn from(line: &OrderLine) -> Self {
        Self {
            name: line.name.clone().unwrap_or_else(|| "Item".to_string()),
            image_url: line.image_url.clone(),
            qty: line.qty,
            price: line.price,
            line_total: line.line_total(),
        }
    }
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            short_id: order.id.short(),
            status: order.status,
            created_at: order.created_at,
            items: order.items.iter().map(Into::into).collect(),
            total: order.total(),
        }
    }
}

/// Order-history response.
#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub poll_seconds: u64,
    pub orders: Vec<OrderView>,
}

/// GET /orders - the current user's orders, newest first.
#[instrument(skip(state, user), fields(user = %user.sub))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<OrdersResponse>> {
    let repo = OrderRepository::new(state.pool());
    let orders = repo.list_for_user(&user.sub).await?;

    Ok(Json(OrdersResponse {
        poll_seconds: ORDERS_POLL_SECONDS,
        orders: orders.iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use canteen_core::{GatewayOrderId, ItemId, OrderId, UserId};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_order_view_total_and_fallback_name() {
        let order = Order {
            id: OrderId::new(Uuid::from_u128(7)),
            gateway_order_id: GatewayOrderId::new("order_x"),
            user_id: UserId::new("sub"),
            user_email: "s@campus.test".to_string(),
            status: OrderStatus::Preparing,
            created_at: Utc::now(),
            items: vec![OrderLine {
                item_id: ItemId::new(3),
                name: None,
                image_url: None,
                qty: 2,
                price: Decimal::from(45),
            }],
        };

        let view = OrderView::from(&order);
        assert_eq!(view.total, Decimal::from(90));
        assert_eq!(view.items.first().map(|l| l.name.as_str()), Some("Item"));
        assert_eq!(view.short_id.len(), 8);
    }
}
