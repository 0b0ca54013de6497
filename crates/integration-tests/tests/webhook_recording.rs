//! Webhook signature and payload handling.
//!
//! The webhook is the only writer of orders, so its gate matters: a
//! signature that does not match the HMAC over the raw body must be
//! rejected before any database work, and the custom payload attached at
//! order creation must survive the round trip through the gateway.

use canteen_core::{Cart, ItemId, ItemSnapshot, UserId};
use canteen_server::services::gateway::{
    CheckoutProfile, CustomData, compute_signature, verify_signature,
};
use rust_decimal::Decimal;
use secrecy::SecretString;

fn webhook_secret() -> SecretString {
    SecretString::from("whsec-8c1d9a2e7f4b3a6c5d0e9f8a7b6c5d4e")
}

fn sample_custom_data() -> CustomData {
    let mut cart = Cart::new();
    cart.update_quantity(
        &ItemSnapshot {
            id: ItemId::new(11),
            name: "Veg Thali".to_string(),
            price: Decimal::from(120),
            image_url: None,
        },
        1,
    );
    cart.update_quantity(
        &ItemSnapshot {
            id: ItemId::new(12),
            name: "Sweet Lassi".to_string(),
            price: Decimal::new(4500, 2),
            image_url: None,
        },
        2,
    );

    CustomData {
        cart,
        profile: CheckoutProfile {
            sub: UserId::new("google-oauth2|1029384756"),
            email: "student@campus.test".to_string(),
        },
    }
}

// =============================================================================
// Signature Verification
// =============================================================================

#[test]
fn test_valid_signature_verifies() {
    let body = serde_json::to_vec(&serde_json::json!({
        "event": "payment.captured",
        "payload": {}
    }))
    .expect("serialize");

    let signature = compute_signature(&webhook_secret(), &body);
    assert!(verify_signature(&webhook_secret(), &body, &signature));
}

#[test]
fn test_mismatched_signature_is_rejected() {
    let body = b"{\"event\":\"payment.captured\"}";
    let other_secret = SecretString::from("whsec-0000000000000000000000000000000");

    let signature = compute_signature(&other_secret, body);
    assert!(!verify_signature(&webhook_secret(), body, &signature));
}

#[test]
fn test_signature_is_over_the_exact_raw_body() {
    // Even a semantically-identical body with different whitespace must fail:
    // verification runs over raw bytes, before any JSON parsing.
    let compact = br#"{"event":"payment.captured"}"#;
    let spaced = br#"{ "event": "payment.captured" }"#;

    let signature = compute_signature(&webhook_secret(), compact);
    assert!(verify_signature(&webhook_secret(), compact, &signature));
    assert!(!verify_signature(&webhook_secret(), spaced, &signature));
}

#[test]
fn test_garbage_signatures_are_rejected() {
    let body = b"body";
    for garbage in ["", "zz", "deadbeef", "not-hex-at-all"] {
        assert!(!verify_signature(&webhook_secret(), body, garbage));
    }
}

// =============================================================================
// Custom Payload Round Trip
// =============================================================================

#[test]
fn test_custom_data_survives_the_notes_field() {
    // The payload rides the gateway as an embedded JSON string; decode what
    // we encoded and the webhook handler sees the same cart and profile.
    let original = sample_custom_data();
    let notes_field = serde_json::to_string(&original).expect("encode");
    let decoded: CustomData = serde_json::from_str(&notes_field).expect("decode");

    assert_eq!(decoded.cart, original.cart);
    assert_eq!(decoded.profile.sub, original.profile.sub);
    assert_eq!(decoded.profile.email, original.profile.email);
    assert_eq!(decoded.cart.subtotal(), Decimal::new(21000, 2));
}

#[test]
fn test_webhook_line_snapshots_preserve_purchase_price() {
    let data = sample_custom_data();
    let lassi = data
        .cart
        .entries()
        .find(|e| e.item.id == ItemId::new(12))
        .expect("lassi in cart");

    // 45.00 at purchase time, whatever the catalog says later.
    assert_eq!(lassi.item.price, Decimal::new(4500, 2));
    assert_eq!(lassi.line_total(), Decimal::new(9000, 2));
}
