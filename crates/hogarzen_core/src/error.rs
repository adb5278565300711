//! crates/hogarzen_core/src/error.rs
//!
//! The application-level error taxonomy surfaced by the core services.

use crate::ports::PortError;
use validator::ValidationErrors;

/// The distinguishable authentication failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    InvalidCredentials,
    DuplicateEmail,
    WeakPassword,
    SessionExpired,
    NotAuthenticated,
    EmailNotConfirmed,
}

impl std::fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            AuthErrorKind::InvalidCredentials => "invalid credentials",
            AuthErrorKind::DuplicateEmail => "email already registered",
            AuthErrorKind::WeakPassword => "password too weak",
            AuthErrorKind::SessionExpired => "session expired",
            AuthErrorKind::NotAuthenticated => "not authenticated",
            AuthErrorKind::EmailNotConfirmed => "email not confirmed",
        };
        f.write_str(text)
    }
}

/// The primary error type for the core services.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppError {
    /// Missing or placeholder credentials for an external service.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Client-side form checks; never reaches the network.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Authentication error: {0}")]
    Auth(AuthErrorKind),

    /// Unreachable backend or timeout.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl AppError {
    pub fn auth(kind: AuthErrorKind) -> Self {
        AppError::Auth(kind)
    }

    pub fn is_auth(&self, kind: AuthErrorKind) -> bool {
        matches!(self, AppError::Auth(k) if *k == kind)
    }
}

impl From<PortError> for AppError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::InvalidCredentials => AppError::Auth(AuthErrorKind::InvalidCredentials),
            PortError::DuplicateAccount => AppError::Auth(AuthErrorKind::DuplicateEmail),
            PortError::WeakPassword(_) => AppError::Auth(AuthErrorKind::WeakPassword),
            PortError::EmailNotConfirmed => AppError::Auth(AuthErrorKind::EmailNotConfirmed),
            PortError::Unauthorized => AppError::Auth(AuthErrorKind::SessionExpired),
            PortError::Network(msg) => AppError::Network(msg),
            PortError::Timeout => AppError::Network("request timed out".to_string()),
            PortError::NotConfigured(msg) => AppError::Configuration(msg),
            PortError::NotFound(msg) | PortError::Malformed(msg) | PortError::Unexpected(msg) => {
                AppError::Unknown(msg)
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

pub type AppResult<T> = Result<T, AppError>;
