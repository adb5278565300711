//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and how it is
//! rendered as an HTTP response carrying a toast for the browser.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use hogarzen_core::notifications::error_toast;
use hogarzen_core::validation::field_messages;
use hogarzen_core::{AppError, AuthErrorKind, Toast};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;
use validator::ValidationErrors;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A classified failure from the core services.
    #[error(transparent)]
    App(#[from] AppError),

    /// Building the shared HTTP client failed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::App(AppError::Validation(errors))
    }
}

/// The body of every failed request. `errors` maps each invalid field to its message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub toast: Toast,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

pub fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Auth(AuthErrorKind::DuplicateEmail) => StatusCode::CONFLICT,
        AppError::Auth(AuthErrorKind::WeakPassword) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Auth(AuthErrorKind::EmailNotConfirmed) => StatusCode::ACCEPTED,
        AppError::Auth(_) => StatusCode::UNAUTHORIZED,
        AppError::Network(_) | AppError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let app_error = match self {
            ApiError::App(e) => e,
            ApiError::Config(e) => AppError::Configuration(e.to_string()),
            other => {
                error!("Request failed: {:?}", other);
                AppError::Unknown(other.to_string())
            }
        };
        let errors = match &app_error {
            AppError::Validation(errors) => Some(field_messages(errors)),
            _ => None,
        };
        let body = ErrorBody {
            toast: error_toast(&app_error),
            errors,
        };
        (status_for(&app_error), Json(body)).into_response()
    }
}
