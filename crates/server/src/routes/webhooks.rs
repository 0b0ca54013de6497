//! Payment gateway webhook receiver.
//!
//! The only writer of `orders` and `order_items`. The gateway signs the raw
//! request body with HMAC-SHA256; anything that fails verification is
//! rejected before it can touch the database. Failures after verification
//! answer non-2xx so the gateway's retry mechanism redelivers - which is
//! also why recording is idempotent on the gateway order id.
//!
//! These responses go to the gateway, never to end users.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use canteen_core::{GatewayOrderId, UserId};

use crate::db::{OrderRepository, RecordOutcome};
use crate::services::gateway::{self, CustomData, PAYMENT_CAPTURED_EVENT, SIGNATURE_HEADER};
use crate::state::AppState;

// =============================================================================
// Wire Types
// =============================================================================

/// Top-level webhook event envelope.
#[derive(Debug, Deserialize)]
struct WebhookEvent {
    event: String,
    payload: WebhookPayload,
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    payment: WebhookPayment,
}

#[derive(Debug, Deserialize)]
struct WebhookPayment {
    entity: PaymentEntity,
}

/// The payment entity: the gateway order it belongs to plus the custom
/// payload we attached at order creation.
#[derive(Debug, Deserialize)]
struct PaymentEntity {
    order_id: String,
    notes: PaymentNotes,
}

#[derive(Debug, Deserialize)]
struct PaymentNotes {
    custom_data: String,
}

// =============================================================================
// Handler
// =============================================================================

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// POST /webhooks/gateway - record captured payments.
#[instrument(skip(state, headers, body))]
pub async fn gateway(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // 1. Authenticity: constant-time HMAC over the raw body.
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        tracing::warn!("webhook without signature header");
        return reject(StatusCode::UNAUTHORIZED, "missing signature");
    };

    let secret = &state.config().gateway.webhook_secret;
    if !gateway::verify_signature(secret, &body, signature) {
        tracing::warn!("webhook signature verification failed");
        return reject(StatusCode::UNAUTHORIZED, "invalid signature");
    }

    // 2. Only captured payments create orders.
    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("malformed webhook body: {e}");
            return reject(StatusCode::BAD_REQUEST, "malformed event");
        }
    };

    if event.event != PAYMENT_CAPTURED_EVENT {
        tracing::debug!(event = %event.event, "ignoring webhook event");
        return (StatusCode::OK, Json(json!({ "status": "ignored" }))).into_response();
    }

    // 3. Decode the {cart, profile} payload attached at order creation.
    let entity = event.payload.payment.entity;
    let custom: CustomData = match serde_json::from_str(&entity.notes.custom_data) {
        Ok(custom) => custom,
        Err(e) => {
            tracing::error!("webhook custom data undecodable: {e}");
            return reject(StatusCode::BAD_REQUEST, "malformed custom data");
        }
    };

    if custom.cart.is_empty() {
        tracing::error!("webhook carried an empty cart");
        return reject(StatusCode::BAD_REQUEST, "empty cart");
    }

    // 4. Record, idempotently on the gateway order id.
    let gateway_order_id = GatewayOrderId::new(entity.order_id);
    let outcome = record(&state, &gateway_order_id, &custom).await;

    match outcome {
        Ok(RecordOutcome::Recorded(order_id)) => {
            tracing::info!(%gateway_order_id, %order_id, "order recorded from webhook");
            (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
        }
        Ok(RecordOutcome::AlreadyRecorded) => {
            tracing::info!(%gateway_order_id, "duplicate webhook delivery, order already recorded");
            (StatusCode::OK, Json(json!({ "status": "ok", "duplicate": true }))).into_response()
        }
        Err(e) => {
            // Non-2xx so the gateway redelivers; the transaction rolled back.
            tracing::error!(%gateway_order_id, "order recording failed: {e}");
            reject(StatusCode::INTERNAL_SERVER_ERROR, "recording failed")
        }
    }
}

async fn record(
    state: &AppState,
    gateway_order_id: &GatewayOrderId,
    custom: &CustomData,
) -> Result<RecordOutcome, crate::db::RepositoryError> {
    let repo = OrderRepository::new(state.pool());
    let user_id: &UserId = &custom.profile.sub;
    repo.record_captured_payment(gateway_order_id, user_id, &custom.profile.email, &custom.cart)
        .await
}

#[cfg(test)]
mod tests {
    use canteen_core::{Cart, ItemId, ItemSnapshot};
    use rust_decimal::Decimal;
    use secrecy::SecretString;

    use crate::services::gateway::{CheckoutProfile, compute_signature, verify_signature};

    use super::*;

    fn sample_event_body() -> Vec<u8> {
        let mut cart = Cart::new();
        cart.update_quantity(
            &ItemSnapshot {
                id: ItemId::new(1),
                name: "Samosa".to_string(),
                price: Decimal::from(20),
                image_url: None,
            },
            2,
        );
        let custom = CustomData {
            cart,
            profile: CheckoutProfile {
                sub: UserId::new("sub-1"),
                email: "s@campus.test".to_string(),
            },
        };
        let body = json!({
            "event": PAYMENT_CAPTURED_EVENT,
            "payload": {
                "payment": {
                    "entity": {
                        "order_id": "order_abc123",
                        "notes": {
                            "custom_data": serde_json::to_string(&custom).expect("serialize"),
                        }
                    }
                }
            }
        });
        serde_json::to_vec(&body).expect("serialize")
    }

    #[test]
    fn test_event_envelope_decodes() {
        let body = sample_event_body();
        let event: WebhookEvent = serde_json::from_slice(&body).expect("decode");
        assert_eq!(event.event, PAYMENT_CAPTURED_EVENT);
        assert_eq!(event.payload.payment.entity.order_id, "order_abc123");

        let custom: CustomData =
            serde_json::from_str(&event.payload.payment.entity.notes.custom_data)
                .expect("decode custom data");
        assert_eq!(custom.cart.item_count(), 2);
        assert_eq!(custom.profile.sub.as_str(), "sub-1");
    }

    #[test]
    fn test_signature_gates_the_raw_body() {
        let secret = SecretString::from("whsec-3f9a8b7c6d5e4f3a2b1c0d9e8f7a6b5c");
        let body = sample_event_body();
        let signature = compute_signature(&secret, &body);

        assert!(verify_signature(&secret, &body, &signature));

        // A single flipped byte invalidates the signature.
        let mut tampered = body.clone();
        if let Some(byte) = tampered.first_mut() {
            *byte = byte.wrapping_add(1);
        }
        assert!(!verify_signature(&secret, &tampered, &signature));
    }

    #[test]
    fn test_unknown_event_is_distinguished() {
        let body = json!({
            "event": "payment.failed",
            "payload": { "payment": { "entity": {
                "order_id": "order_x", "notes": { "custom_data": "{}" }
            }}}
        });
        let event: WebhookEvent =
            serde_json::from_slice(&serde_json::to_vec(&body).expect("serialize"))
                .expect("decode");
        assert_ne!(event.event, PAYMENT_CAPTURED_EVENT);
    }
}
