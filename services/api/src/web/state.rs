//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-request session scope.

use crate::adapters::CookieJar;
use crate::config::{Config, ConfigurationIssue};
use axum::http::HeaderMap;
use hogarzen_core::ports::{AuthBackend, TaskRepository};
use hogarzen_core::{AuthManager, ChatAssistant, TaskStore};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_backend: Arc<dyn AuthBackend>,
    pub task_repo: Arc<dyn TaskRepository>,
    pub assistant: Arc<ChatAssistant>,
    /// Computed once at startup; served by `/status` as a banner.
    pub config_issues: Arc<Vec<ConfigurationIssue>>,
}

//=========================================================================================
// SessionScope (Specific to One Request)
//=========================================================================================

/// The browser session behind one request: an `AuthManager` whose storage is the
/// request's cookie jar.
#[derive(Clone)]
pub struct SessionScope {
    pub auth: Arc<AuthManager>,
    pub jar: Arc<CookieJar>,
}

impl SessionScope {
    pub fn new(state: &AppState, headers: &HeaderMap) -> Self {
        let jar = Arc::new(CookieJar::from_headers(headers, state.config.cookie_secure));
        let auth = Arc::new(AuthManager::new(state.auth_backend.clone(), jar.clone()));
        Self { auth, jar }
    }

    /// A task store bound to this session. It starts empty; load before mutating.
    pub fn task_store(&self, state: &AppState) -> TaskStore {
        TaskStore::new(state.task_repo.clone(), self.auth.clone())
    }
}
