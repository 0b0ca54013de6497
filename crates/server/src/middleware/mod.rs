//! Middleware: session layer, session-state boundary, auth extractors.

pub mod auth;
pub mod session;
pub mod session_state;

pub use auth::{OptionalAuth, RequireAuth, RequireStaff};
pub use session::create_session_layer;
