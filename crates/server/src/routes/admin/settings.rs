//! Admin global settings: the store-wide ordering toggle.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::settings;
use crate::error::Result;
use crate::middleware::RequireStaff;
use crate::state::AppState;

/// Global settings response.
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub receive_orders: bool,
}

/// Toggle request.
#[derive(Debug, Deserialize)]
pub struct SetReceiveOrdersRequest {
    pub receive_orders: bool,
}

/// Toggle response: the new flag plus how many items were paused with it.
#[derive(Debug, Serialize)]
pub struct SetReceiveOrdersResponse {
    pub receive_orders: bool,
    pub items_paused: u64,
}

/// GET /admin/settings - current global settings.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> Result<Json<SettingsResponse>> {
    let receive_orders = settings::receive_orders(state.pool()).await?;
    Ok(Json(SettingsResponse { receive_orders }))
}

/// PUT /admin/settings/receive-orders - open or pause ordering store-wide.
///
/// Pausing also marks every catalog item unavailable in the same
/// transaction, so the menu flips to "Paused" atomically. Reopening leaves
/// items paused; staff re-enable them individually.
#[instrument(skip(state, staff), fields(staff = %staff.sub))]
pub async fn set_receive_orders(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(request): Json<SetReceiveOrdersRequest>,
) -> Result<Json<SetReceiveOrdersResponse>> {
    let items_paused = settings::set_receive_orders(state.pool(), request.receive_orders).await?;
    state.invalidate_catalog().await;

    tracing::info!(
        receive_orders = request.receive_orders,
        items_paused,
        "ordering toggled"
    );

    Ok(Json(SetReceiveOrdersResponse {
        receive_orders: request.receive_orders,
        items_paused,
    }))
}
