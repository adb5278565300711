//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: register, login, logout, session restore and the
//! cookie consent flag.

use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use hogarzen_core::validation::{validate_register_form, FormValidation, RegisterForm};
use hogarzen_core::{User, UserAction};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::response::{respond, ActionResult};
use crate::web::state::SessionScope;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub accept_terms: Option<bool>,
    #[serde(default)]
    pub remember_me: bool,
}

impl RegisterRequest {
    fn form(&self) -> RegisterForm {
        RegisterForm {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
            accept_terms: self.accept_terms,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct ConsentRequest {
    pub accepted: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: Option<UserResponse>,
    pub cookie_consent: Option<bool>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create an account and sign in
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created and signed in"),
        (status = 202, description = "Account created; email confirmation pending"),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid form fields"),
        (status = 503, description = "Auth service unreachable or not configured")
    )
)]
pub async fn register_handler(
    Extension(scope): Extension<SessionScope>,
    Json(req): Json<RegisterRequest>,
) -> ActionResult<UserResponse> {
    validate_register_form(&req.form()).map_err(ApiError::from)?;

    let outcome = scope
        .auth
        .register(&req.name, &req.email, &req.password, req.remember_me)
        .await;
    respond(UserAction::Register, outcome.map(UserResponse::from))
}

/// POST /auth/register/check - Field errors and password strength while typing
///
/// Never creates an account and never calls the auth provider.
#[utoipa::path(
    post,
    path = "/auth/register/check",
    request_body = RegisterRequest,
    responses((status = 200, description = "isValid, per-field errors and passwordStrength"))
)]
pub async fn register_check_handler(Json(req): Json<RegisterRequest>) -> Json<FormValidation> {
    Json(FormValidation::register(&req.form()))
}

/// POST /auth/login - Sign in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in"),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Invalid form fields"),
        (status = 503, description = "Auth service unreachable or not configured")
    )
)]
pub async fn login_handler(
    Extension(scope): Extension<SessionScope>,
    Json(req): Json<LoginRequest>,
) -> ActionResult<UserResponse> {
    let outcome = scope
        .auth
        .login(&req.email, &req.password, req.remember_me)
        .await;
    respond(UserAction::Login, outcome.map(UserResponse::from))
}

/// POST /auth/logout - End the session
///
/// Always succeeds; the session cookies are cleared even if the provider is down.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Signed out"))
)]
pub async fn logout_handler(Extension(scope): Extension<SessionScope>) -> ActionResult<()> {
    scope.auth.logout().await;
    respond(UserAction::Logout, Ok(()))
}

/// GET /auth/session - Restore the session from its cookies
#[utoipa::path(
    get,
    path = "/auth/session",
    responses((status = 200, description = "Current session", body = SessionResponse))
)]
pub async fn session_handler(Extension(scope): Extension<SessionScope>) -> Json<SessionResponse> {
    let user = scope.auth.restore_session().await;
    Json(SessionResponse {
        authenticated: user.is_some(),
        user: user.map(UserResponse::from),
        cookie_consent: scope.auth.cookie_consent(),
    })
}

/// POST /auth/consent - Record the cookie banner answer
#[utoipa::path(
    post,
    path = "/auth/consent",
    request_body = ConsentRequest,
    responses((status = 200, description = "Consent stored", body = SessionResponse))
)]
pub async fn consent_handler(
    Extension(scope): Extension<SessionScope>,
    Json(req): Json<ConsentRequest>,
) -> Json<SessionResponse> {
    scope.auth.set_cookie_consent(req.accepted);
    let user = scope.auth.restore_session().await;
    Json(SessionResponse {
        authenticated: user.is_some(),
        user: user.map(UserResponse::from),
        cookie_consent: Some(req.accepted),
    })
}
