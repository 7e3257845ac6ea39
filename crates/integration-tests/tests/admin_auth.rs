//! Integration tests for registration, login and logout.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The admin server running (cargo run -p fernway-admin)
//!
//! Run with: cargo test -p fernway-integration-tests -- --ignored

use reqwest::{Client, StatusCode};

use fernway_integration_tests::{admin_base_url, no_redirect_client, unique_suffix};

/// Register a fresh account, returning its (username, email, password).
async fn register_user(client: &Client) -> (String, String, String) {
    let base_url = admin_base_url();
    let suffix = unique_suffix();
    let username = format!("user_{suffix}");
    let email = format!("user_{suffix}@example.com");
    let password = "a sturdy passphrase".to_string();

    let resp = client
        .post(format!("{base_url}/register"))
        .form(&[
            ("username", username.as_str()),
            ("email", email.as_str()),
            ("password", password.as_str()),
        ])
        .send()
        .await
        .expect("Failed to register");

    assert!(resp.status().is_redirection());
    (username, email, password)
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_health() {
    let client = no_redirect_client();
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach health endpoint");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_register_redirects_to_login() {
    let client = no_redirect_client();
    let base_url = admin_base_url();
    let suffix = unique_suffix();

    let resp = client
        .post(format!("{base_url}/register"))
        .form(&[
            ("username", format!("user_{suffix}").as_str()),
            ("email", format!("user_{suffix}@example.com").as_str()),
            ("password", "a sturdy passphrase"),
        ])
        .send()
        .await
        .expect("Failed to register");

    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/login");
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_duplicate_registration_rejected() {
    let client = no_redirect_client();
    let base_url = admin_base_url();
    let (username, email, password) = register_user(&client).await;

    // Second registration with the same email re-renders the form
    let resp = client
        .post(format!("{base_url}/register"))
        .form(&[
            ("username", username.as_str()),
            ("email", email.as_str()),
            ("password", password.as_str()),
        ])
        .send()
        .await
        .expect("Failed to send duplicate registration");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("already taken"));
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_login_wrong_password_rejected() {
    let client = no_redirect_client();
    let base_url = admin_base_url();
    let (_, email, _) = register_user(&client).await;

    let resp = client
        .post(format!("{base_url}/login"))
        .form(&[("email", email.as_str()), ("password", "wrong password")])
        .send()
        .await
        .expect("Failed to send login");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Invalid email or password"));
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_login_unknown_email_gets_same_message() {
    let client = no_redirect_client();
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/login"))
        .form(&[
            ("email", "nobody@example.com"),
            ("password", "whatever password"),
        ])
        .send()
        .await
        .expect("Failed to send login");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Invalid email or password"));
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_login_logout_flow() {
    let client = no_redirect_client();
    let base_url = admin_base_url();
    let (_, email, password) = register_user(&client).await;

    // Login sets a session and redirects to the listing
    let resp = client
        .post(format!("{base_url}/login"))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to login");
    assert!(resp.status().is_redirection());

    // Protected page now reachable
    let resp = client
        .get(format!("{base_url}/products/new"))
        .send()
        .await
        .expect("Failed to get create form");
    assert_eq!(resp.status(), StatusCode::OK);

    // Logout destroys the session
    let resp = client
        .get(format!("{base_url}/logout"))
        .send()
        .await
        .expect("Failed to logout");
    assert!(resp.status().is_redirection());

    // Protected page redirects to login again
    let resp = client
        .get(format!("{base_url}/products/new"))
        .send()
        .await
        .expect("Failed to get create form");
    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/login");
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_protected_routes_redirect_anonymous() {
    let client = no_redirect_client();
    let base_url = admin_base_url();

    for path in ["/products/new", "/products/1/edit"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to request protected route");

        assert!(resp.status().is_redirection(), "expected redirect on {path}");
        let location = resp
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert_eq!(location, "/login");
    }
}
