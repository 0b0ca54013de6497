//! Session-related types.
//!
//! The session is the server-side home of what the browser app used to keep
//! in local storage: the signed-in profile, the cart, and the in-flight
//! gateway order id. All of it is best-effort state: corrupt or missing
//! values fall back to defaults at the load boundary (see
//! `middleware::session_state`).

use serde::{Deserialize, Serialize};

use canteen_core::UserId;

/// Session-stored user identity.
///
/// The profile claims arrive pre-verified from the OAuth callback at the
/// edge; this service only stores and reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// OAuth subject claim.
    pub sub: UserId,
    /// Display name.
    pub name: String,
    /// Contact email, as supplied by the provider.
    pub email: String,
    /// Contact phone, if the provider supplied one.
    pub phone: Option<String>,
    /// Whether this user may use the staff routes.
    #[serde(default)]
    pub staff: bool,
}

impl CurrentUser {
    /// First name for greetings, matching the menu header.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("Guest")
    }
}

/// Session keys for per-user state.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the serialized shopping cart.
    pub const CART: &str = "cart";

    /// Key for the gateway order id awaiting webhook-confirmed completion.
    pub const INFLIGHT_ORDER_ID: &str = "inflight_order_id";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_name() {
        let user = CurrentUser {
            sub: UserId::new("sub-1"),
            name: "Priya Sharma".to_string(),
            email: "priya@campus.test".to_string(),
            phone: None,
            staff: false,
        };
        assert_eq!(user.first_name(), "Priya");

        let unnamed = CurrentUser {
            name: String::new(),
            ..user
        };
        assert_eq!(unnamed.first_name(), "Guest");
    }

    #[test]
    fn test_staff_defaults_false_on_old_sessions() {
        let json = r#"{"sub": "s", "name": "n", "email": "e", "phone": null}"#;
        let user: CurrentUser = serde_json::from_str(json).expect("deserialize");
        assert!(!user.staff);
    }
}
