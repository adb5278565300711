//! Shared router fixtures: an app over unconfigured hosted adapters, and one over
//! in-memory auth and task backends for signed-in flows.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_lib::adapters::{HostedApi, HostedAuthAdapter, HostedTaskAdapter, OpenAiChatAdapter};
use api_lib::config::Config;
use api_lib::web::{build_router, state::AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use chrono::{DateTime, Utc};
use hogarzen_core::domain::{NewTaskRow, User, UserTask};
use hogarzen_core::ports::{
    AuthBackend, PortError, PortResult, RemoteSession, SignUpOutcome, TaskRepository,
};
use hogarzen_core::{ChatAssistant, ChatSettings};
use http_body_util::BodyExt;
use serde_json::Value;
use uuid::Uuid;

//=========================================================================================
// Fakes
//=========================================================================================

#[derive(Default)]
pub struct FakeAuth {
    accounts: Mutex<HashMap<String, (User, String)>>,
    tokens: Mutex<HashMap<String, Uuid>>,
}

impl FakeAuth {
    pub fn add_account(&self, name: &str, email: &str, password: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (user.clone(), password.to_string()));
        user
    }

    pub fn revoke_all_tokens(&self) {
        self.tokens.lock().unwrap().clear();
    }

    fn issue(&self, user: &User) -> RemoteSession {
        let token = format!("token-{}", Uuid::new_v4());
        self.tokens.lock().unwrap().insert(token.clone(), user.id);
        RemoteSession {
            access_token: token,
            expires_at: None,
            user: user.clone(),
        }
    }
}

#[async_trait]
impl AuthBackend for FakeAuth {
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> PortResult<SignUpOutcome> {
        if self.accounts.lock().unwrap().contains_key(email) {
            return Err(PortError::DuplicateAccount);
        }
        let user = self.add_account(name, email, password);
        let session = Some(self.issue(&user));
        Ok(SignUpOutcome { user, session })
    }

    async fn sign_in(&self, email: &str, password: &str) -> PortResult<RemoteSession> {
        let account = self.accounts.lock().unwrap().get(email).cloned();
        match account {
            Some((user, stored)) if stored == password => Ok(self.issue(&user)),
            _ => Err(PortError::InvalidCredentials),
        }
    }

    async fn sign_out(&self, token: &str) -> PortResult<()> {
        self.tokens.lock().unwrap().remove(token);
        Ok(())
    }

    async fn get_user(&self, token: &str) -> PortResult<User> {
        let user_id = self
            .tokens
            .lock()
            .unwrap()
            .get(token)
            .copied()
            .ok_or(PortError::Unauthorized)?;
        self.accounts
            .lock()
            .unwrap()
            .values()
            .find(|(user, _)| user.id == user_id)
            .map(|(user, _)| user.clone())
            .ok_or(PortError::Unauthorized)
    }
}

/// A task table that can be told to start rejecting every token, as when the
/// provider expires a session server-side.
#[derive(Default)]
pub struct FakeTasks {
    rows: Mutex<Vec<UserTask>>,
    pub reject_tokens: AtomicBool,
}

impl FakeTasks {
    pub fn rows(&self) -> Vec<UserTask> {
        self.rows.lock().unwrap().clone()
    }

    fn check(&self) -> PortResult<()> {
        if self.reject_tokens.load(Ordering::SeqCst) {
            Err(PortError::Unauthorized)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TaskRepository for FakeTasks {
    async fn list_tasks(&self, _token: &str, user_id: Uuid) -> PortResult<Vec<UserTask>> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_task(&self, _token: &str, row: NewTaskRow) -> PortResult<UserTask> {
        self.check()?;
        let task = UserTask {
            id: Uuid::new_v4(),
            user_id: row.user_id,
            template_id: row.template_id,
            title: row.title,
            description: row.description,
            category: row.category,
            priority: row.priority,
            completed: row.completed,
            completed_at: None,
            order: row.order,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn set_completion(
        &self,
        _token: &str,
        task_id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> PortResult<UserTask> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let task = rows
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or_else(|| PortError::NotFound(task_id.to_string()))?;
        task.completed = completed;
        task.completed_at = completed_at;
        Ok(task.clone())
    }

    async fn delete_task(&self, _token: &str, task_id: Uuid) -> PortResult<()> {
        self.check()?;
        self.rows.lock().unwrap().retain(|task| task.id != task_id);
        Ok(())
    }
}

//=========================================================================================
// Apps
//=========================================================================================

fn assistant(config: &Config) -> ChatAssistant {
    ChatAssistant::new(
        Arc::new(OpenAiChatAdapter::new(None, &config.gemini_base_url, config.chat_model.clone())),
        ChatSettings {
            timeout: Duration::from_millis(200),
            ..ChatSettings::default()
        },
    )
}

/// Every hosted service left unconfigured.
pub fn unconfigured_app() -> Router {
    let config = Config::from_lookup(|_| None).unwrap();
    let hosted = HostedApi::new(reqwest::Client::new(), config.backend_credentials());
    let state = AppState {
        config_issues: Arc::new(config.configuration_issues()),
        assistant: Arc::new(assistant(&config)),
        auth_backend: Arc::new(HostedAuthAdapter::new(hosted.clone())),
        task_repo: Arc::new(HostedTaskAdapter::new(hosted)),
        config: Arc::new(config),
    };
    build_router(Arc::new(state))
}

pub struct SignedInApp {
    pub auth: Arc<FakeAuth>,
    pub tasks: Arc<FakeTasks>,
    pub router: Router,
}

impl SignedInApp {
    pub fn new() -> Self {
        let auth = Arc::new(FakeAuth::default());
        let tasks = Arc::new(FakeTasks::default());
        let config = Config::from_lookup(|_| None).unwrap();
        let state = AppState {
            config_issues: Arc::new(Vec::new()),
            assistant: Arc::new(assistant(&config)),
            auth_backend: auth.clone(),
            task_repo: tasks.clone(),
            config: Arc::new(config),
        };
        Self {
            auth,
            tasks,
            router: build_router(Arc::new(state)),
        }
    }

    /// Signs Ana in through `/auth/login` and returns the `Cookie` header to replay.
    pub async fn login_ana(&self) -> String {
        use tower::ServiceExt;

        self.auth.add_account("Ana", "ana@x.com", "Secret123!");
        let resp = self
            .router
            .clone()
            .oneshot(post_json(
                "/auth/login",
                serde_json::json!({ "email": "ana@x.com", "password": "Secret123!" }),
                None,
            ))
            .await
            .unwrap();
        assert!(resp.status().is_success(), "login failed: {}", resp.status());
        cookie_header(&resp)
    }
}

//=========================================================================================
// Requests and Responses
//=========================================================================================

pub fn post_json(uri: &str, body: Value, cookies: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookies) = cookies {
        builder = builder.header(header::COOKIE, cookies);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn request(method: &str, uri: &str, cookies: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookies) = cookies {
        builder = builder.header(header::COOKIE, cookies);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn set_cookies(resp: &Response) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// The `Cookie` header a browser would send back after this response.
pub fn cookie_header(resp: &Response) -> String {
    set_cookies(resp)
        .iter()
        .filter(|line| !line.contains("Max-Age=0"))
        .filter_map(|line| line.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

pub async fn body_json(resp: Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
