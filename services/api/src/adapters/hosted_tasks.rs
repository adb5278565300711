//! services/api/src/adapters/hosted_tasks.rs
//!
//! The task table adapter, the concrete implementation of the `TaskRepository` port.
//! Rows live in the hosted `user_tasks` table and are reached through its REST
//! interface. Row-level security scopes every query to the bearer token's user.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hogarzen_core::domain::{NewTaskRow, TaskCategory, TaskPriority, UserTask};
use hogarzen_core::ports::{PortError, PortResult, TaskRepository};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::hosted::{read_json, send, HostedApi};

const TABLE_PATH: &str = "/rest/v1/user_tasks";

#[derive(Clone)]
pub struct HostedTaskAdapter {
    api: HostedApi,
}

impl HostedTaskAdapter {
    pub fn new(api: HostedApi) -> Self {
        Self { api }
    }
}

//=========================================================================================
// "Impure" Table Record Structs
//=========================================================================================

#[derive(Debug, Deserialize)]
struct TaskRecord {
    id: Uuid,
    user_id: Uuid,
    #[serde(default)]
    template_id: Option<String>,
    title: String,
    #[serde(default)]
    description: Option<String>,
    category: TaskCategory,
    #[serde(default)]
    priority: TaskPriority,
    completed: bool,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    sort_order: i32,
    created_at: DateTime<Utc>,
}
impl TaskRecord {
    fn to_domain(self) -> UserTask {
        UserTask {
            id: self.id,
            user_id: self.user_id,
            template_id: self.template_id,
            title: self.title,
            description: self.description,
            category: self.category,
            priority: self.priority,
            completed: self.completed,
            completed_at: self.completed_at,
            order: self.sort_order,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewTaskRecord {
    user_id: Uuid,
    template_id: Option<String>,
    title: String,
    description: Option<String>,
    category: TaskCategory,
    priority: TaskPriority,
    completed: bool,
    sort_order: i32,
}
impl From<NewTaskRow> for NewTaskRecord {
    fn from(row: NewTaskRow) -> Self {
        Self {
            user_id: row.user_id,
            template_id: row.template_id,
            title: row.title,
            description: row.description,
            category: row.category,
            priority: row.priority,
            completed: row.completed,
            sort_order: row.order,
        }
    }
}

/// Writes ask for the affected rows back; an empty answer means the filter matched nothing.
fn single_row(mut rows: Vec<TaskRecord>, task_id: Uuid) -> PortResult<UserTask> {
    match rows.pop() {
        Some(row) => Ok(row.to_domain()),
        None => Err(PortError::NotFound(format!("Task with id {} not found", task_id))),
    }
}

//=========================================================================================
// `TaskRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl TaskRepository for HostedTaskAdapter {
    async fn list_tasks(&self, token: &str, user_id: Uuid) -> PortResult<Vec<UserTask>> {
        let path = format!(
            "{TABLE_PATH}?select=*&user_id=eq.{user_id}&order=sort_order.asc,created_at.asc"
        );
        let request = self.api.request(Method::GET, &path, Some(token))?;
        let rows: Vec<TaskRecord> = read_json(send(request).await?).await?;
        Ok(rows.into_iter().map(TaskRecord::to_domain).collect())
    }

    async fn insert_task(&self, token: &str, row: NewTaskRow) -> PortResult<UserTask> {
        let request = self
            .api
            .request(Method::POST, TABLE_PATH, Some(token))?
            .header("Prefer", "return=representation")
            .json(&NewTaskRecord::from(row));
        let mut rows: Vec<TaskRecord> = read_json(send(request).await?).await?;
        rows.pop()
            .map(TaskRecord::to_domain)
            .ok_or_else(|| PortError::Malformed("insert returned no row".to_string()))
    }

    async fn set_completion(
        &self,
        token: &str,
        task_id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> PortResult<UserTask> {
        let path = format!("{TABLE_PATH}?id=eq.{task_id}");
        let request = self
            .api
            .request(Method::PATCH, &path, Some(token))?
            .header("Prefer", "return=representation")
            .json(&json!({ "completed": completed, "completed_at": completed_at }));
        let rows: Vec<TaskRecord> = read_json(send(request).await?).await?;
        single_row(rows, task_id)
    }

    async fn delete_task(&self, token: &str, task_id: Uuid) -> PortResult<()> {
        let path = format!("{TABLE_PATH}?id=eq.{task_id}");
        let request = self
            .api
            .request(Method::DELETE, &path, Some(token))?
            .header("Prefer", "return=representation");
        let rows: Vec<TaskRecord> = read_json(send(request).await?).await?;
        single_row(rows, task_id).map(|_| ())
    }
}
