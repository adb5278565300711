pub mod auth;
pub mod chat;
pub mod response;
pub mod rest;
pub mod session;
pub mod state;
pub mod tasks;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use self::state::AppState;

/// Assembles the API routes. Every route sees the cookie session; the task and
/// chat routes additionally require a signed-in user.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/register/check", post(auth::register_check_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/session", get(auth::session_handler))
        .route("/auth/consent", post(auth::consent_handler))
        .route("/catalog", get(rest::catalog_handler))
        .route("/status", get(rest::status_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/tasks",
            get(tasks::list_tasks_handler).post(tasks::create_task_handler),
        )
        .route("/tasks/summary", get(tasks::summary_handler))
        .route("/tasks/{id}/toggle", post(tasks::toggle_task_handler))
        .route("/tasks/{id}", delete(tasks::delete_task_handler))
        .route("/chat", post(chat::chat_handler))
        .route("/chat/suggestions", get(chat::suggestions_handler))
        .layer(axum_middleware::from_fn(session::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            session::session_scope,
        ))
        .with_state(app_state)
}
