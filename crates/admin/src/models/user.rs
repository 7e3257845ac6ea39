//! User domain types.

use chrono::{DateTime, Utc};

use fernway_core::{Email, UserId, Username};

/// An account holder (domain type).
///
/// The password hash is deliberately absent: it stays inside the
/// repository/auth-service boundary and is never rendered or logged.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name, unique across the site.
    pub username: Username,
    /// Email address, unique across the site.
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
