//! Admin order management: the live order board and status transitions.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use canteen_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::db::orders::OrderStats;
use crate::error::Result;
use crate::middleware::RequireStaff;
use crate::models::Order;
use crate::routes::orders::{ORDERS_POLL_SECONDS, OrderLineView};
use crate::state::AppState;

/// One order on the staff board: the user view plus who placed it.
#[derive(Debug, Serialize)]
pub struct StaffOrderView {
    pub id: String,
    pub short_id: String,
    pub user_email: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderLineView>,
    pub total: Decimal,
}

impl From<&Order> for StaffOrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            short_id: order.id.short(),
            user_email: order.user_email.clone(),
            status: order.status,
            created_at: order.created_at,
            items: order.items.iter().map(Into::into).collect(),
            total: order.total(),
        }
    }
}

/// Staff order-board response.
#[derive(Debug, Serialize)]
pub struct StaffOrdersResponse {
    pub poll_seconds: u64,
    pub statuses: Vec<OrderStatus>,
    pub orders: Vec<StaffOrderView>,
}

/// Status transition request.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// GET /admin/orders - every order, newest first.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> Result<Json<StaffOrdersResponse>> {
    let repo = OrderRepository::new(state.pool());
    let orders = repo.list_all().await?;

    Ok(Json(StaffOrdersResponse {
        poll_seconds: ORDERS_POLL_SECONDS,
        statuses: OrderStatus::ALL.to_vec(),
        orders: orders.iter().map(Into::into).collect(),
    }))
}

/// GET /admin/orders/stats - today's performance numbers.
#[instrument(skip(state))]
pub async fn stats(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> Result<Json<OrderStats>> {
    let repo = OrderRepository::new(state.pool());
    Ok(Json(repo.stats_today().await?))
}

/// PUT /admin/orders/{id}/status - move an order through its lifecycle.
#[instrument(skip(state, staff), fields(staff = %staff.sub))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>> {
    let order_id = OrderId::new(id);
    let repo = OrderRepository::new(state.pool());
    repo.update_status(order_id, request.status).await?;

    tracing::info!(order = %order_id, status = %request.status, "order status updated");
    Ok(Json(serde_json::json!({
        "id": order_id.to_string(),
        "status": request.status,
    })))
}
