//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to product listing
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (database ping)
//!
//! # Auth
//! GET  /register               - Registration page
//! POST /register               - Create account
//! GET  /login                  - Login page
//! POST /login                  - Authenticate, start session
//! GET  /logout                 - Destroy session
//!
//! # Products (login required except listing)
//! GET  /products               - Product listing
//! GET  /products/new           - Create form
//! POST /products               - Create product (multipart, image required)
//! GET  /products/{id}/edit     - Edit form
//! PUT  /products/{id}          - Update product (multipart, image optional)
//! DELETE /products/{id}        - Delete product and its hosted image
//! ```
//!
//! HTML forms reach PUT and DELETE through the `?_method=` query override
//! applied before routing.

pub mod auth;
pub mod products;

use axum::{
    Router,
    response::Redirect,
    routing::{get, put},
};

use crate::state::AppState;

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        // Auth
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        // Products
        .route(
            "/products",
            get(products::index).post(products::create),
        )
        .route("/products/new", get(products::new_form))
        .route("/products/{id}/edit", get(products::edit_form))
        .route(
            "/products/{id}",
            put(products::update).delete(products::destroy),
        )
}

/// The admin has no dashboard; the product listing is the landing page.
async fn home() -> Redirect {
    Redirect::to("/products")
}
