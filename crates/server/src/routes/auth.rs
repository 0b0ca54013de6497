//! Auth route handlers.
//!
//! The OAuth dance itself happens at the edge (the identity provider and its
//! callback are external collaborators). What lands here is the verified
//! profile, which these handlers install into / remove from the session.
//! Staff access is decided server-side against the configured allowlist,
//! never taken from the request.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use canteen_core::UserId;

use crate::error::{self, Result};
use crate::middleware::{OptionalAuth, auth, session_state};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Verified OAuth profile, as posted by the callback.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub sub: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Session identity response.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: Option<CurrentUser>,
}

/// POST /auth/login - install the verified profile into the session.
#[instrument(skip(state, session, request), fields(sub = %request.sub))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<MeResponse>> {
    let user = CurrentUser {
        staff: state.config().is_staff(request.sub.as_str()),
        sub: request.sub,
        name: request.name,
        email: request.email,
        phone: request.phone,
    };

    auth::set_current_user(&session, &user).await?;
    error::set_sentry_user(&user.sub, Some(&user.email));
    tracing::info!(staff = user.staff, "user signed in");

    Ok(Json(MeResponse { user: Some(user) }))
}

/// POST /auth/logout - clear user, cart, and in-flight marker.
///
/// The cart's lifecycle ends at logout; an in-flight payment marker is
/// dropped with it (the webhook still records the order server-side).
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<MeResponse>> {
    auth::clear_current_user(&session).await?;
    session_state::clear_cart(&session).await?;
    session_state::clear_inflight_order(&session).await?;
    error::clear_sentry_user();

    Ok(Json(MeResponse { user: None }))
}

/// GET /auth/me - who the session says we are.
#[instrument(skip(user))]
pub async fn me(OptionalAuth(user): OptionalAuth) -> Json<MeResponse> {
    Json(MeResponse { user })
}
