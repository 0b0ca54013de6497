//! Checkout route handlers.
//!
//! Thin JSON wrappers over `services::checkout`. The client-side sequence:
//! `POST /checkout` for a payment session, launch the hosted UI with it,
//! then `POST /checkout/reconcile` once the modal closes. A page reload
//! mid-payment can recover via `GET /checkout/status`.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use canteen_core::GatewayOrderId;

use crate::config::GatewayEnvMode;
use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::{RequireAuth, session_state};
use crate::services::checkout::{self, ReconcilePolicy, ReconcileOutcome};
use crate::state::AppState;

/// Response to a successful checkout start.
#[derive(Debug, Serialize)]
pub struct CheckoutStarted {
    pub order_id: GatewayOrderId,
    pub payment_session_id: String,
    pub env_mode: GatewayEnvMode,
}

/// In-flight awareness for page reloads.
#[derive(Debug, Serialize)]
pub struct CheckoutStatus {
    /// The gateway order awaiting finalization, if any.
    pub in_flight: Option<GatewayOrderId>,
    /// Whether the webhook has already recorded it (single probe, no poll).
    pub recorded: bool,
}

/// Client-initiated payment verification request.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub order_id: GatewayOrderId,
}

/// Gateway payment status, relayed verbatim.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub status: String,
}

/// POST /checkout - run preconditions and create the gateway order.
#[instrument(skip(state, session, user))]
pub async fn begin(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<Json<CheckoutStarted>> {
    let order = checkout::begin(&state, &session, &user).await?;

    Ok(Json(CheckoutStarted {
        order_id: order.order_id,
        payment_session_id: order.payment_session_id,
        env_mode: order.env_mode,
    }))
}

/// POST /checkout/reconcile - poll for the webhook-written order.
///
/// Blocks for up to the reconcile horizon (60 s). A timeout is reported as
/// `still_finalizing`, not as an error: the cart and in-flight marker are
/// kept and the order will surface in "My Orders" when the webhook lands.
#[instrument(skip(state, session))]
pub async fn reconcile(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    session: Session,
) -> Result<Json<ReconcileOutcome>> {
    let outcome = checkout::reconcile(&state, &session, ReconcilePolicy::default()).await?;
    Ok(Json(outcome))
}

/// GET /checkout/status - in-flight marker plus a single recorded probe.
#[instrument(skip(state, session))]
pub async fn status(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutStatus>> {
    let in_flight = session_state::inflight_order(&session).await;

    let recorded = match &in_flight {
        Some(gateway_order_id) => {
            let repo = OrderRepository::new(state.pool());
            repo.exists_by_gateway_id(gateway_order_id).await?.is_some()
        }
        None => false,
    };

    Ok(Json(CheckoutStatus { in_flight, recorded }))
}

/// POST /checkout/cancel - abandon the in-flight payment attempt.
///
/// Dismissing the hosted payment UI is terminal for that attempt: the
/// in-flight marker is cleared so the user can retry, while the cart is
/// kept. There is no gateway-side cancellation signal; if the payment did
/// in fact capture, the webhook still records the order.
#[instrument(skip(session))]
pub async fn cancel(
    RequireAuth(_user): RequireAuth,
    session: Session,
) -> Result<Json<CheckoutStatus>> {
    if let Some(gateway_order_id) = session_state::inflight_order(&session).await {
        session_state::clear_inflight_order(&session).await?;
        tracing::info!(%gateway_order_id, "checkout attempt abandoned");
    }

    Ok(Json(CheckoutStatus {
        in_flight: None,
        recorded: false,
    }))
}

/// POST /checkout/verify - read the payment status from the gateway.
///
/// Read-only: the verdict shown to the user comes from the gateway, but the
/// order record is written exclusively by the webhook path.
#[instrument(skip(state))]
pub async fn verify(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>> {
    let status = state.gateway().payment_status(&request.order_id).await?;
    Ok(Json(VerifyResponse { status }))
}
