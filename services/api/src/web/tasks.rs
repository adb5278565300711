//! services/api/src/web/tasks.rs
//!
//! Task endpoints. Every handler works on a `TaskStore` bound to the caller's
//! session and loaded from the table before it is touched.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use hogarzen_core::validation::validate_new_task;
use hogarzen_core::{NewTask, TaskPriority, TaskStore, TaskSummary, User, UserAction, UserTask};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::response::{respond, ActionResult};
use crate::web::state::{AppState, SessionScope};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// One of the catalog categories, e.g. `limpieza` or `seguridad`.
    pub category: String,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub template_id: Option<String>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        NewTask {
            title: req.title,
            description: req.description,
            category: req.category,
            priority: req.priority,
            template_id: req.template_id,
        }
    }
}

#[derive(Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<UserTask>,
    pub summary: TaskSummary,
}

async fn loaded_store(state: &AppState, scope: &SessionScope, user: &User) -> Result<TaskStore, ApiError> {
    let store = scope.task_store(state);
    store.load_tasks(user.id).await?;
    Ok(store)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /tasks - The signed-in user's tasks with their summary
#[utoipa::path(
    get,
    path = "/tasks",
    responses(
        (status = 200, description = "Tasks ordered by their order field"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<AppState>>,
    Extension(scope): Extension<SessionScope>,
    Extension(user): Extension<User>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let store = loaded_store(&state, &scope, &user).await?;
    Ok(Json(TaskListResponse {
        tasks: store.tasks().await,
        summary: store.summary().await,
    }))
}

/// GET /tasks/summary - Completion counts for the dashboard
#[utoipa::path(
    get,
    path = "/tasks/summary",
    responses(
        (status = 200, description = "Totals and completion rate"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(scope): Extension<SessionScope>,
    Extension(user): Extension<User>,
) -> Result<Json<TaskSummary>, ApiError> {
    let store = loaded_store(&state, &scope, &user).await?;
    Ok(Json(store.summary().await))
}

/// POST /tasks - Add a task, from the catalog or custom
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 200, description = "Task added"),
        (status = 401, description = "Not signed in or session expired"),
        (status = 422, description = "Invalid task fields")
    )
)]
pub async fn create_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(scope): Extension<SessionScope>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateTaskRequest>,
) -> ActionResult<UserTask> {
    let candidate = NewTask::from(req);
    // Reject bad input before any remote call, including the load.
    validate_new_task(&candidate)?;

    let store = loaded_store(&state, &scope, &user).await?;
    respond(UserAction::AddTask, store.add_task(candidate).await)
}

/// POST /tasks/{id}/toggle - Flip a task between pending and completed
#[utoipa::path(
    post,
    path = "/tasks/{id}/toggle",
    params(("id" = Uuid, Path, description = "The task to toggle")),
    responses(
        (status = 200, description = "Task toggled"),
        (status = 401, description = "Not signed in or session expired"),
        (status = 503, description = "Change could not be saved; it was rolled back")
    )
)]
pub async fn toggle_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(scope): Extension<SessionScope>,
    Extension(user): Extension<User>,
    Path(task_id): Path<Uuid>,
) -> ActionResult<UserTask> {
    let store = loaded_store(&state, &scope, &user).await?;
    let outcome = store.toggle_complete(task_id).await;
    let action = match &outcome {
        Ok(task) if !task.completed => UserAction::ReopenTask,
        _ => UserAction::CompleteTask,
    };
    respond(action, outcome)
}

/// DELETE /tasks/{id} - Remove a task
///
/// Removing a task that is not in the list succeeds without a remote call.
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = Uuid, Path, description = "The task to remove")),
    responses(
        (status = 200, description = "Task removed"),
        (status = 401, description = "Not signed in or session expired")
    )
)]
pub async fn delete_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(scope): Extension<SessionScope>,
    Extension(user): Extension<User>,
    Path(task_id): Path<Uuid>,
) -> ActionResult<()> {
    let store = loaded_store(&state, &scope, &user).await?;
    respond(UserAction::RemoveTask, store.remove_task(task_id).await)
}
