//! services/api/src/web/rest.rs
//!
//! Public informational endpoints and the master OpenAPI document.

use axum::{extract::State, Json};
use hogarzen_core::catalog::catalog;
use hogarzen_core::notifications::error_toast;
use hogarzen_core::{AppError, TaskTemplate, Toast};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::config::ConfigurationIssue;
use crate::web::state::AppState;
use crate::web::{auth, chat, tasks};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        status_handler,
        catalog_handler,
        auth::register_handler,
        auth::register_check_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::session_handler,
        auth::consent_handler,
        tasks::list_tasks_handler,
        tasks::summary_handler,
        tasks::create_task_handler,
        tasks::toggle_task_handler,
        tasks::delete_task_handler,
        chat::chat_handler,
        chat::suggestions_handler,
    ),
    components(
        schemas(
            StatusResponse,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::ConsentRequest,
            auth::UserResponse,
            auth::SessionResponse,
            tasks::CreateTaskRequest,
            chat::ChatRequest,
            chat::ChatResponse,
            chat::SuggestionsResponse,
        )
    ),
    tags(
        (name = "HogarZen API", description = "Household task organizer: accounts, tasks and the help assistant.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Response Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub configured: bool,
    #[schema(value_type = Vec<Object>)]
    pub issues: Vec<ConfigurationIssue>,
    /// A persistent warning to show while credentials are missing.
    #[schema(value_type = Option<Object>)]
    pub banner: Option<Toast>,
    pub chat_available: bool,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /status - Configuration health and assistant reachability
#[utoipa::path(
    get,
    path = "/status",
    responses((status = 200, description = "Service status", body = StatusResponse))
)]
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let issues = state.config_issues.as_ref().clone();
    let banner = issues.first().map(|issue| {
        error_toast(&AppError::Configuration(issue.message.clone()))
    });
    Json(StatusResponse {
        configured: issues.is_empty(),
        banner,
        chat_available: state.assistant.test_connection().await,
        issues,
    })
}

/// GET /catalog - The predefined task templates
#[utoipa::path(
    get,
    path = "/catalog",
    responses((status = 200, description = "Task templates grouped by category"))
)]
pub async fn catalog_handler() -> Json<&'static [TaskTemplate]> {
    Json(catalog())
}
