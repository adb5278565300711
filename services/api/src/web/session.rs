//! services/api/src/web/session.rs
//!
//! Middleware that binds each request to its cookie session and protects routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
    Extension,
};
use hogarzen_core::{AppError, AuthErrorKind};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::web::state::{AppState, SessionScope};

/// Builds the request's `SessionScope` and writes back any cookies it changed.
pub async fn session_scope(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let scope = SessionScope::new(&state, req.headers());
    req.extensions_mut().insert(scope.clone());

    let mut response = next.run(req).await;

    for cookie in scope.jar.set_cookie_headers() {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!("Dropping unencodable cookie: {:?}", e),
        }
    }
    response
}

/// Middleware that restores the session from its cookies.
///
/// If valid, inserts the `User` into request extensions for handlers to use.
/// If invalid or missing, answers 401 with a sign-in toast.
pub async fn require_auth(
    Extension(scope): Extension<SessionScope>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = scope.auth.restore_session().await.ok_or_else(|| {
        debug!("Rejected request without a valid session");
        ApiError::App(AppError::auth(AuthErrorKind::NotAuthenticated))
    })?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
