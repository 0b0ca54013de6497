//! Payment gateway API client.
//!
//! Creates gateway orders for checkout and reads payment status for the
//! client-initiated verify endpoint. The gateway's hosted checkout UI and its
//! webhook delivery are external; this module also owns the webhook
//! signature scheme (HMAC-SHA256 over the raw body, hex-encoded) since both
//! sides of it live here.
//!
//! The authoritative record of a payment is the `payment.captured` webhook.
//! Nothing in this client writes orders.

use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use canteen_core::{Cart, GatewayOrderId, ItemId, UserId};

use crate::config::{GatewayConfig, GatewayEnvMode};

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-gateway-signature";

/// Webhook event name for a captured payment.
pub const PAYMENT_CAPTURED_EVENT: &str = "payment.captured";

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur when interacting with the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response. `message` is the gateway's own
    /// `error` field, surfaced verbatim to the user.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A required field was missing from an otherwise-OK response.
    #[error("Missing field in gateway response: {0}")]
    MissingField(&'static str),

    /// Failed to parse a response or build a request.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A freshly-created gateway order: everything the client needs to launch
/// the hosted payment UI.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayOrder {
    pub order_id: GatewayOrderId,
    pub payment_session_id: String,
    pub env_mode: GatewayEnvMode,
}

/// One cart line as the gateway expects it.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayLineItem {
    pub id: ItemId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image: Option<String>,
}

/// Customer contact details attached to the gateway order.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetails {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// The custom payload attached to the payment-creation request and handed
/// back by the `payment.captured` webhook. This is what lets the webhook
/// handler write the order without trusting the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomData {
    pub cart: Cart,
    pub profile: CheckoutProfile,
}

/// The slice of the user profile the webhook needs to record an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutProfile {
    pub sub: UserId,
    pub email: String,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: Decimal,
    currency: &'a str,
    line_items: &'a [GatewayLineItem],
    customer: &'a CustomerDetails,
    notes: Notes,
}

#[derive(Serialize)]
struct Notes {
    custom_data: String,
}

#[derive(Deserialize)]
struct CreateOrderResponse {
    order_id: Option<String>,
    payment_session_id: Option<String>,
}

#[derive(Deserialize)]
struct OrderStatusResponse {
    status: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
}

/// Payment gateway API client.
#[derive(Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    api_url: String,
    env_mode: GatewayEnvMode,
}

impl GatewayClient {
    /// Create a new gateway API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "x-client-id",
            HeaderValue::from_str(&config.client_id)
                .map_err(|e| GatewayError::Parse(format!("Invalid client id format: {e}")))?,
        );

        let mut secret_value =
            HeaderValue::from_str(config.client_secret.expose_secret())
                .map_err(|e| GatewayError::Parse(format!("Invalid client secret format: {e}")))?;
        secret_value.set_sensitive(true);
        headers.insert("x-client-secret", secret_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            env_mode: config.env_mode,
        })
    }

    /// Create a payment order with the gateway.
    ///
    /// The response must carry both the gateway order id and a payment
    /// session id; anything less fails the checkout.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Api` with the gateway's `error` message on a
    /// non-2xx response, or `GatewayError::MissingField` on a 2xx response
    /// without the required fields.
    pub async fn create_order(
        &self,
        amount: Decimal,
        currency: &str,
        line_items: &[GatewayLineItem],
        customer: &CustomerDetails,
        custom_data: &CustomData,
    ) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/v1/orders", self.api_url);

        let custom_data = serde_json::to_string(custom_data)
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        let body = CreateOrderBody {
            amount,
            currency,
            line_items,
            customer,
            notes: Notes { custom_data },
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Self::api_error(status.as_u16(), response).await);
        }

        let parsed: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        let order_id = parsed
            .order_id
            .ok_or(GatewayError::MissingField("order_id"))?;
        let payment_session_id = parsed
            .payment_session_id
            .ok_or(GatewayError::MissingField("payment_session_id"))?;

        Ok(GatewayOrder {
            order_id: GatewayOrderId::new(order_id),
            payment_session_id,
            env_mode: self.env_mode,
        })
    }

    /// Read the payment status of a gateway order.
    ///
    /// Returns the gateway's status string verbatim (its standard
    /// payment-status vocabulary). Read-only: order recording happens solely
    /// through the webhook.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Api` on a non-2xx response.
    pub async fn payment_status(
        &self,
        order_id: &GatewayOrderId,
    ) -> Result<String, GatewayError> {
        let url = format!("{}/v1/orders/{}", self.api_url, order_id.as_str());

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Self::api_error(status.as_u16(), response).await);
        }

        let parsed: OrderStatusResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        parsed.status.ok_or(GatewayError::MissingField("status"))
    }

    /// Extract the gateway's JSON `error` field, falling back to raw text.
    async fn api_error(status: u16, response: reqwest::Response) -> GatewayError {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or(text);
        GatewayError::Api { status, message }
    }
}

// =============================================================================
// Webhook Signatures
// =============================================================================

/// Compute the hex-encoded HMAC-SHA256 signature over a raw webhook body.
///
/// HMAC-SHA256 accepts keys of any length, so the only failure mode is
/// an empty digest on a broken `hmac` build; `verify_signature` would
/// reject that.
#[must_use]
pub fn compute_signature(secret: &SecretString, body: &[u8]) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()) else {
        return String::new();
    };
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a webhook signature in constant time.
///
/// The provided value is the hex digest from the signature header. Returns
/// false for malformed hex, wrong-length digests, and mismatches alike.
/// Comparison goes through `Mac::verify_slice`, never string equality.
#[must_use]
pub fn verify_signature(secret: &SecretString, body: &[u8], provided: &str) -> bool {
    let Ok(provided_bytes) = hex::decode(provided) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&provided_bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use canteen_core::{ItemId, ItemSnapshot};
    use rust_decimal::Decimal;

    use super::*;

    fn secret() -> SecretString {
        SecretString::from("test-webhook-secret-0123456789abcdef")
    }

    #[test]
    fn test_signature_round_trip() {
        let body = br#"{"event":"payment.captured"}"#;
        let sig = compute_signature(&secret(), body);
        assert!(verify_signature(&secret(), body, &sig));
    }

    #[test]
    fn test_signature_rejects_tampered_body() {
        let sig = compute_signature(&secret(), b"original body");
        assert!(!verify_signature(&secret(), b"tampered body", &sig));
    }

    #[test]
    fn test_signature_rejects_wrong_secret() {
        let body = b"same body";
        let sig = compute_signature(&SecretString::from("other-secret-value-9876543210"), body);
        assert!(!verify_signature(&secret(), body, &sig));
    }

    #[test]
    fn test_signature_rejects_malformed_hex() {
        assert!(!verify_signature(&secret(), b"body", "not hex at all"));
        assert!(!verify_signature(&secret(), b"body", "abcd")); // wrong length
        assert!(!verify_signature(&secret(), b"body", ""));
    }

    #[test]
    fn test_custom_data_round_trip() {
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
        let data = CustomData {
            cart,
            profile: CheckoutProfile {
                sub: UserId::new("sub-1"),
                email: "student@campus.test".to_string(),
            },
        };

        let json = serde_json::to_string(&data).expect("serialize");
        let back: CustomData = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.cart.item_count(), 2);
        assert_eq!(back.profile.email, "student@campus.test");
    }
}
