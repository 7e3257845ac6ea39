//! User account management commands.
//!
//! # Usage
//!
//! ```bash
//! fernway-cli user create -u alice -e alice@example.com -p "correct horse"
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use secrecy::SecretString;
use thiserror::Error;

use fernway_admin::db::{self, RepositoryError, UserRepository};
use fernway_admin::services::auth;
use fernway_core::{Email, Username};

/// Errors that can occur during user management.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid username.
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] fernway_core::UsernameError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] fernway_core::EmailError),

    /// Password or hashing problem.
    #[error("{0}")]
    Auth(#[from] auth::AuthError),

    /// Username or email is already taken.
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

/// Create a new user account.
///
/// # Errors
///
/// Returns `UserError` if validation fails, the user already exists, or the
/// database is unreachable.
pub async fn create(username: &str, email: &str, password: &str) -> Result<(), UserError> {
    dotenvy::dotenv().ok();

    let username = Username::parse(username)?;
    let email = Email::parse(email)?;

    let password_hash = auth::hash_password(password)?;

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| UserError::MissingEnvVar("ADMIN_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let user = UserRepository::new(&pool)
        .create(&username, &email, &password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::UserExists(email.to_string()),
            other => UserError::Repository(other),
        })?;

    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        "User created successfully"
    );

    Ok(())
}
