//! crates/hogarzen_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the hosted auth/table API, the generative model and the
//! cookie mechanism used to persist sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::{ChatMessage, NewTaskRow, User, UserTask};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (HTTP status codes,
/// provider error payloads, transport failures).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("An account with this email already exists")]
    DuplicateAccount,
    #[error("Password rejected by provider: {0}")]
    WeakPassword(String),
    #[error("Email address has not been confirmed")]
    EmailNotConfirmed,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Service not configured: {0}")]
    NotConfigured(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Auth Port
//=========================================================================================

/// A session as granted by the hosted auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSession {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: User,
}

/// Signup may or may not sign the user in, depending on whether the provider
/// requires email confirmation first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user: User,
    pub session: Option<RemoteSession>,
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> PortResult<SignUpOutcome>;

    async fn sign_in(&self, email: &str, password: &str) -> PortResult<RemoteSession>;

    async fn sign_out(&self, token: &str) -> PortResult<()>;

    /// Resolves the user behind a token; `Unauthorized` when the token is no longer valid.
    async fn get_user(&self, token: &str) -> PortResult<User>;
}

//=========================================================================================
// Task Table Port
//=========================================================================================

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list_tasks(&self, token: &str, user_id: Uuid) -> PortResult<Vec<UserTask>>;

    async fn insert_task(&self, token: &str, row: NewTaskRow) -> PortResult<UserTask>;

    async fn set_completion(
        &self,
        token: &str,
        task_id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> PortResult<UserTask>;

    async fn delete_task(&self, token: &str, task_id: Uuid) -> PortResult<()>;
}

//=========================================================================================
// Generative Model Port
//=========================================================================================

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produces the assistant's next line for the given conversation.
    async fn complete(&self, system_prompt: &str, messages: &[ChatMessage]) -> PortResult<String>;

    /// A cheap reachability probe.
    async fn ping(&self) -> PortResult<()>;
}

//=========================================================================================
// Session Storage Port
//=========================================================================================

/// How long a stored value should outlive the current browsing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    /// Dropped when the browser session ends.
    Session,
    Persistent(Duration),
}

/// A small key/value store backing the client session (cookies in the web service).
/// Only `AuthManager` writes to it.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str, retention: Retention);

    fn remove(&self, key: &str);
}
