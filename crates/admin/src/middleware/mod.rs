//! Request middleware: session layer, access guard, method override.

pub mod auth;
pub mod method_override;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use method_override::method_override;
pub use session::{SESSION_LIFETIME_SECONDS, create_session_layer};
