//! Checkout orchestration.
//!
//! The one nontrivial flow in the service. A checkout runs through four
//! client-observed states:
//!
//! 1. **Idle** - the user triggers checkout on their cart total.
//! 2. **Creating remote order** - [`begin`] checks preconditions, creates a
//!    gateway order for subtotal + service charge, and records the gateway
//!    order id as in-flight in the session.
//! 3. **Awaiting payment** - the client launches the gateway's hosted UI
//!    with the returned session id; this service is not involved until the
//!    modal closes.
//! 4. **Reconciliation** - [`reconcile`] polls the orders table for the
//!    webhook-written record. Found: cart and in-flight marker are cleared.
//!    Not found within the horizon: both are kept and the outcome is
//!    `StillFinalizing` - the webhook may land later, so a poll timeout is
//!    never treated as payment failure (at-least-once, eventually
//!    consistent).
//!
//! Payment confirmation is authoritative only via the server-to-server
//! webhook; the client is never trusted to assert "I paid", which is why
//! step 4 watches for the webhook's side effect instead of writing anything.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use canteen_core::{GatewayOrderId, OrderId};

use crate::db::{OrderRepository, settings};
use crate::error::{AppError, Result};
use crate::middleware::session_state;
use crate::models::CurrentUser;
use crate::services::gateway::{
    CheckoutProfile, CustomData, CustomerDetails, GatewayLineItem, GatewayOrder,
};
use crate::state::AppState;

/// How often and for how long [`reconcile`] probes for the webhook-written
/// order. 2 s x 60 s = at most 30 probes.
#[derive(Debug, Clone, Copy)]
pub struct ReconcilePolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(60),
        }
    }
}

/// What [`reconcile`] observed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// The webhook has recorded the order; cart and in-flight marker cleared.
    Confirmed {
        order_id: OrderId,
        gateway_order_id: GatewayOrderId,
    },
    /// No record within the horizon. Cart and in-flight marker are kept; the
    /// order is expected to appear in "My Orders" once the webhook lands.
    StillFinalizing { gateway_order_id: GatewayOrderId },
}

/// Begin a checkout: preconditions, gateway order creation, in-flight marker.
///
/// Precondition failures return before any network call is made. A second
/// checkout while one is in flight is rejected naming the pending order, so
/// two rapid submissions cannot create two gateway orders.
///
/// # Errors
///
/// - [`AppError::OrderingPaused`] when the store-wide flag is off
/// - [`AppError::EmptyCart`] when there is nothing to pay for
/// - [`AppError::CheckoutPending`] when an earlier payment is unresolved
/// - [`AppError::Gateway`] when order creation fails (cart left intact)
#[instrument(skip(state, session, user), fields(user = %user.sub))]
pub async fn begin(state: &AppState, session: &Session, user: &CurrentUser) -> Result<GatewayOrder> {
    if !settings::receive_orders(state.pool()).await? {
        return Err(AppError::OrderingPaused);
    }

    let cart = session_state::load_cart(session).await;
    if cart.is_empty() {
        return Err(AppError::EmptyCart);
    }

    if let Some(pending) = session_state::inflight_order(session).await {
        return Err(AppError::CheckoutPending(pending));
    }

    let line_items: Vec<GatewayLineItem> = cart
        .entries()
        .map(|entry| GatewayLineItem {
            id: entry.item.id,
            name: entry.item.name.clone(),
            price: entry.item.price,
            quantity: entry.qty,
            image: entry.item.image_url.clone(),
        })
        .collect();

    let customer = CustomerDetails {
        id: user.sub.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        phone: user.phone.clone(),
    };

    let custom_data = CustomData {
        cart: cart.clone(),
        profile: CheckoutProfile {
            sub: user.sub.clone(),
            email: user.email.clone(),
        },
    };

    let currency = canteen_core::CurrencyCode::default();
    let order = state
        .gateway()
        .create_order(
            cart.total(),
            currency.code(),
            &line_items,
            &customer,
            &custom_data,
        )
        .await?;

    // Persisted before returning so a page reload mid-payment still knows a
    // gateway order is outstanding.
    session_state::set_inflight_order(session, &order.order_id).await?;

    tracing::info!(
        gateway_order_id = %order.order_id,
        amount = %cart.total(),
        "gateway order created"
    );

    Ok(order)
}

/// Reconcile the in-flight payment against the webhook-written record.
///
/// Polls the orders table by gateway order id per `policy`. The timeout is
/// deliberately not an error: the cart and the in-flight marker survive it.
///
/// # Errors
///
/// - [`AppError::BadRequest`] when no payment is in flight
/// - [`AppError::Database`] if a probe itself fails
#[instrument(skip(state, session, policy))]
pub async fn reconcile(
    state: &AppState,
    session: &Session,
    policy: ReconcilePolicy,
) -> Result<ReconcileOutcome> {
    let Some(gateway_order_id) = session_state::inflight_order(session).await else {
        return Err(AppError::BadRequest(
            "no payment is awaiting finalization".to_string(),
        ));
    };

    let repo = OrderRepository::new(state.pool());
    let found = poll_until(policy, || repo.exists_by_gateway_id(&gateway_order_id)).await?;

    match found {
        Some(order_id) => {
            session_state::clear_cart(session).await?;
            session_state::clear_inflight_order(session).await?;
            tracing::info!(%gateway_order_id, %order_id, "order reconciled");
            Ok(ReconcileOutcome::Confirmed {
                order_id,
                gateway_order_id,
            })
        }
        None => {
            // Keep cart and marker: the webhook may still arrive.
            tracing::warn!(%gateway_order_id, "reconciliation timed out, finalizing in background");
            Ok(ReconcileOutcome::StillFinalizing { gateway_order_id })
        }
    }
}

/// Drive a probe on a fixed interval until it yields a value or the horizon
/// passes. Probes immediately, then every `policy.interval`; gives up once
/// `policy.timeout` has elapsed.
pub async fn poll_until<T, E, F, Fut>(
    policy: ReconcilePolicy,
    mut probe: F,
) -> std::result::Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<Option<T>, E>>,
{
    let start = tokio::time::Instant::now();
    loop {
        if let Some(value) = probe().await? {
            return Ok(Some(value));
        }
        if start.elapsed() + policy.interval >= policy.timeout {
            return Ok(None);
        }
        tokio::time::sleep(policy.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn policy() -> ReconcilePolicy {
        ReconcilePolicy::default()
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_times_out_after_thirty_probes() {
        // 60 s horizon at 2 s cadence: probes at t=0,2,...,58 -> 30 attempts,
        // then gives up without sleeping past the horizon.
        let attempts = AtomicU32::new(0);
        let result: std::result::Result<Option<OrderId>, Infallible> = poll_until(policy(), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok(None) }
        })
        .await;

        assert!(matches!(result, Ok(None)));
        assert_eq!(attempts.load(Ordering::SeqCst), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_returns_on_first_hit() {
        let attempts = AtomicU32::new(0);
        let result: std::result::Result<Option<u8>, Infallible> = poll_until(policy(), || {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok((n == 5).then_some(7)) }
        })
        .await;

        assert_eq!(result, Ok(Some(7)));
        assert_eq!(attempts.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_propagates_probe_errors() {
        let result: std::result::Result<Option<u8>, &str> =
            poll_until(policy(), || async { Err("database down") }).await;
        assert_eq!(result, Err("database down"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_respects_custom_policy() {
        let attempts = AtomicU32::new(0);
        let fast = ReconcilePolicy {
            interval: Duration::from_millis(10),
            timeout: Duration::from_millis(35),
        };
        let result: std::result::Result<Option<u8>, Infallible> = poll_until(fast, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok(None) }
        })
        .await;

        assert!(matches!(result, Ok(None)));
        // t=0,10,20 probe; at t=20 elapsed+interval=30 < 35, probe at 30;
        // then 30+10 >= 35 stops. 4 attempts.
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_default_policy_matches_contract() {
        let p = ReconcilePolicy::default();
        assert_eq!(p.interval, Duration::from_secs(2));
        assert_eq!(p.timeout, Duration::from_secs(60));
    }
}
