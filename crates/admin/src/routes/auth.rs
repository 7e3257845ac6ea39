//! Authentication route handlers.
//!
//! Registration creates an account and sends the user to the login page;
//! login starts a session with a fixed one-hour deadline.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::{
    Expiry, Session,
    cookie::time::{Duration, OffsetDateTime},
};

use crate::error::AppError;
use crate::filters;
use crate::middleware::{SESSION_LIFETIME_SECONDS, set_current_user};
use crate::models::CurrentUser;
use crate::services::AuthService;
use crate::services::auth::AuthError;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page() -> impl IntoResponse {
    RegisterTemplate { error: None }
}

/// Handle registration form submission.
///
/// Validation failures re-render the form with a message; nothing is
/// persisted on failure. Success redirects to the login page without
/// starting a session.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool());

    match auth
        .register(&form.username, &form.email, &form.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "New user registered");
            Ok(Redirect::to("/login").into_response())
        }
        Err(AuthError::UserAlreadyExists) => Ok(RegisterTemplate {
            error: Some("Username or email already taken.".to_string()),
        }
        .into_response()),
        Err(
            e @ (AuthError::InvalidUsername(_)
            | AuthError::InvalidEmail(_)
            | AuthError::WeakPassword(_)),
        ) => Ok(RegisterTemplate {
            error: Some(e.to_string()),
        }
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page() -> impl IntoResponse {
    LoginTemplate {
        error: None,
        success: None,
    }
}

/// Handle login form submission.
///
/// On success the session ID is rotated, the identity is stored, and the
/// session is given a fixed expiry one hour out. Activity does not extend
/// the deadline.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool());

    match auth.login(&form.email, &form.password).await {
        Ok(user) => {
            // Fresh session ID on privilege change
            if let Err(e) = session.cycle_id().await {
                tracing::error!(error = %e, "Failed to cycle session ID");
                return Err(AppError::Internal("session error".to_string()));
            }

            let current_user = CurrentUser {
                id: user.id,
                username: user.username.clone(),
                email: user.email,
            };
            set_current_user(&session, &current_user)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to set session");
                    AppError::Internal("session error".to_string())
                })?;

            let deadline =
                OffsetDateTime::now_utc() + Duration::seconds(SESSION_LIFETIME_SECONDS);
            session.set_expiry(Some(Expiry::AtDateTime(deadline)));

            tracing::info!(user_id = %user.id, username = %user.username, "User logged in");
            Ok(Redirect::to("/products").into_response())
        }
        Err(AuthError::InvalidCredentials) => Ok(LoginTemplate {
            error: Some("Invalid email or password.".to_string()),
            success: None,
        }
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Destroys the server-side session record. The redirect to the login page
/// happens whether or not destruction succeeded; on failure the cookie is
/// left alone so the session can still be destroyed on a retry.
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to destroy session on logout");
    }

    Redirect::to("/login")
}
