//! crates/hogarzen_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs carry serde derives because the session profile is cached in
//! a cookie and the task rows travel as JSON, but they know nothing about HTTP.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

//=========================================================================================
// Users and Sessions
//=========================================================================================

/// The authenticated person. Owned by the hosted auth provider; this is a cached copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A signed-in session as held by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub expires_at: Option<DateTime<Utc>>,
    pub remember_me: bool,
}

//=========================================================================================
// Tasks
//=========================================================================================

/// The closed set of household task categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Limpieza,
    Cocina,
    Seguridad,
    Mantenimiento,
    Compras,
    Lavanderia,
    Mascotas,
    Jardin,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 8] = [
        TaskCategory::Limpieza,
        TaskCategory::Cocina,
        TaskCategory::Seguridad,
        TaskCategory::Mantenimiento,
        TaskCategory::Compras,
        TaskCategory::Lavanderia,
        TaskCategory::Mascotas,
        TaskCategory::Jardin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Limpieza => "limpieza",
            TaskCategory::Cocina => "cocina",
            TaskCategory::Seguridad => "seguridad",
            TaskCategory::Mantenimiento => "mantenimiento",
            TaskCategory::Compras => "compras",
            TaskCategory::Lavanderia => "lavanderia",
            TaskCategory::Mascotas => "mascotas",
            TaskCategory::Jardin => "jardin",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a category string is not part of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized task category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for TaskCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('í', "i");
        TaskCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Baja,
    #[default]
    Media,
    Alta,
}

/// A catalog entry users can add to their own checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: TaskCategory,
    pub priority: TaskPriority,
    pub icon: &'static str,
}

/// A candidate task as typed by the user, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewTask {
    #[validate(custom(function = "crate::validation::check_task_title"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(custom(function = "crate::validation::check_category"))]
    pub category: String,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub template_id: Option<String>,
}

impl NewTask {
    pub fn from_template(template: &TaskTemplate) -> Self {
        Self {
            title: template.title.to_string(),
            description: Some(template.description.to_string()),
            category: template.category.as_str().to_string(),
            priority: Some(template.priority),
            template_id: Some(template.id.to_string()),
        }
    }
}

/// The validated row sent to the task repository on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTaskRow {
    pub user_id: Uuid,
    pub template_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub category: TaskCategory,
    pub priority: TaskPriority,
    pub completed: bool,
    pub order: i32,
}

/// A task assigned to a user's checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTask {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub template_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: TaskCategory,
    #[serde(default)]
    pub priority: TaskPriority,
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Whole-number percentage of completed tasks, 0 when the list is empty.
    pub completion_rate: u8,
}

//=========================================================================================
// Chat
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single chat line. Lives only in memory for the current conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}
