//! Integration tests for Fernway.
//!
//! The tests in `tests/` drive a running admin server over HTTP; they are
//! `#[ignore]`d by default so `cargo test` stays self-contained.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p fernway-cli -- migrate
//!
//! # Start the admin server
//! cargo run -p fernway-admin
//!
//! # Run the ignored integration tests against it
//! cargo test -p fernway-integration-tests -- --ignored
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

/// Base URL for the admin server (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// HTTP client with a cookie store, following redirects.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// HTTP client with a cookie store that does not follow redirects, for
/// asserting on redirect responses directly.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique suffix for test usernames and emails, so repeated runs against
/// the same database don't collide.
///
/// # Panics
///
/// Panics if the system clock is before the Unix epoch.
#[must_use]
pub fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before Unix epoch")
        .as_nanos();
    format!("{nanos:x}")
}
