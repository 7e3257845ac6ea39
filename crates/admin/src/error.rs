//! Unified error handling for admin.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::imagekit::ImageHostError;
use crate::services::products::ProductFlowError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Submitted input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Login failed. One variant for both unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Product create was submitted without an image file.
    #[error("An image file is required")]
    MissingImage,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Image host operation failed.
    #[error("Image host error: {0}")]
    ExternalService(#[from] ImageHostError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::InvalidUsername(err) => Self::Validation(err.to_string()),
            AuthError::InvalidEmail(err) => Self::Validation(err.to_string()),
            AuthError::WeakPassword(msg) => Self::Validation(msg),
            AuthError::UserAlreadyExists => {
                Self::Validation("username or email already taken".to_string())
            }
            AuthError::Repository(err) => Self::Database(err),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_string()),
        }
    }
}

impl From<ProductFlowError> for AppError {
    fn from(e: ProductFlowError) -> Self {
        match e {
            ProductFlowError::NotFound => Self::NotFound("product".to_string()),
            ProductFlowError::MissingImage => Self::MissingImage,
            ProductFlowError::Host(err) => Self::ExternalService(err),
            ProductFlowError::Store(err) => Self::Database(err),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        Self::Validation(format!("malformed form submission: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::ExternalService(_)
        ) {
            tracing::error!(error = %self, "Admin request error");
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) | Self::ExternalService(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::MissingImage => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::ExternalService(_) => "External service error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product".to_string());
        assert_eq!(err.to_string(), "Not found: product");

        let err = AppError::Validation("price must be a number".to_string());
        assert_eq!(err.to_string(), "Validation error: price must be a number");
    }

    #[test]
    fn test_app_error_status_codes() {
        // Test that errors map to correct HTTP status codes
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(AppError::MissingImage), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_errors_are_not_exposed() {
        let response = AppError::Internal("connection string leaked".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_product_flow_error_mapping() {
        assert!(matches!(
            AppError::from(ProductFlowError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(ProductFlowError::MissingImage),
            AppError::MissingImage
        ));
    }
}
