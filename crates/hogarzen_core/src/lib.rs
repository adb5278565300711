pub mod auth;
pub mod catalog;
pub mod chat;
pub mod domain;
pub mod error;
pub mod notifications;
pub mod ports;
pub mod tasks;
pub mod validation;

pub use auth::{AuthManager, AuthState, SessionTicket};
pub use chat::{ChatAssistant, ChatConversation, ChatSettings};
pub use domain::{
    ChatMessage, ChatRole, NewTask, Session, TaskCategory, TaskPriority, TaskSummary,
    TaskTemplate, User, UserTask,
};
pub use error::{AppError, AppResult, AuthErrorKind};
pub use notifications::{Severity, Toast, UserAction};
pub use ports::{
    AuthBackend, ChatModel, PortError, PortResult, Retention, SessionStorage, TaskRepository,
};
pub use tasks::TaskStore;
