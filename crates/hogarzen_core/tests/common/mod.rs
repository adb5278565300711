//! In-memory fakes of every port, shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use uuid::Uuid;

use hogarzen_core::domain::{ChatMessage, NewTaskRow, User, UserTask};
use hogarzen_core::ports::{
    AuthBackend, ChatModel, PortError, PortResult, RemoteSession, Retention, SessionStorage,
    SignUpOutcome, TaskRepository,
};
use hogarzen_core::{AuthManager, TaskStore};

//=========================================================================================
// Session storage
//=========================================================================================

#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, (String, Retention)>>,
}

impl MemoryStorage {
    pub fn retention(&self, key: &str) -> Option<Retention> {
        self.values.lock().unwrap().get(key).map(|(_, r)| *r)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.lock().unwrap().contains_key(key)
    }

    /// Writes a value directly, bypassing the manager (simulates a tampered cookie).
    pub fn put(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), Retention::Session));
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).map(|(v, _)| v.clone())
    }

    fn set(&self, key: &str, value: &str, retention: Retention) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), retention));
    }

    fn remove(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }
}

//=========================================================================================
// Auth backend
//=========================================================================================

#[derive(Default)]
pub struct FakeAuthBackend {
    accounts: Mutex<HashMap<String, (User, String)>>,
    tokens: Mutex<HashMap<String, Uuid>>,
    pub offline: AtomicBool,
    pub require_confirmation: AtomicBool,
    pub sign_up_calls: AtomicUsize,
    pub sign_in_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
}

impl FakeAuthBackend {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn revoke_all_tokens(&self) {
        self.tokens.lock().unwrap().clear();
    }

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

    fn issue(&self, user: &User) -> RemoteSession {
        let token = format!("token-{}", Uuid::new_v4());
        self.tokens.lock().unwrap().insert(token.clone(), user.id);
        RemoteSession {
            access_token: token,
            expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
            user: user.clone(),
        }
    }

    fn check_online(&self) -> PortResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(PortError::Network("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AuthBackend for FakeAuthBackend {
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> PortResult<SignUpOutcome> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        if self.accounts.lock().unwrap().contains_key(email) {
            return Err(PortError::DuplicateAccount);
        }
        let user = self.add_account(name, email, password);
        let session = if self.require_confirmation.load(Ordering::SeqCst) {
            None
        } else {
            Some(self.issue(&user))
        };
        Ok(SignUpOutcome { user, session })
    }

    async fn sign_in(&self, email: &str, password: &str) -> PortResult<RemoteSession> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let account = self.accounts.lock().unwrap().get(email).cloned();
        match account {
            Some((user, stored)) if stored == password => Ok(self.issue(&user)),
            _ => Err(PortError::InvalidCredentials),
        }
    }

    async fn sign_out(&self, token: &str) -> PortResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.tokens.lock().unwrap().remove(token);
        Ok(())
    }

    async fn get_user(&self, token: &str) -> PortResult<User> {
        self.check_online()?;
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

//=========================================================================================
// Task repository
//=========================================================================================

#[derive(Default)]
pub struct FakeTaskRepo {
    rows: Mutex<Vec<UserTask>>,
    fail_next: Mutex<Option<PortError>>,
    hold_inserts: Mutex<Option<Arc<Notify>>>,
    pub insert_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FakeTaskRepo {
    pub fn fail_next(&self, err: PortError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    /// Makes the next inserts wait until the returned handle is notified.
    pub fn hold_inserts(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.hold_inserts.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn seed(&self, task: UserTask) {
        self.rows.lock().unwrap().push(task);
    }

    pub fn remove_row(&self, task_id: Uuid) {
        self.rows.lock().unwrap().retain(|row| row.id != task_id);
    }

    pub fn row(&self, task_id: Uuid) -> Option<UserTask> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == task_id)
            .cloned()
    }

    fn take_failure(&self) -> PortResult<()> {
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskRepository for FakeTaskRepo {
    async fn list_tasks(&self, _token: &str, user_id: Uuid) -> PortResult<Vec<UserTask>> {
        self.take_failure()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_task(&self, _token: &str, row: NewTaskRow) -> PortResult<UserTask> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.hold_inserts.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.take_failure()?;
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
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id == task_id)
            .ok_or_else(|| PortError::NotFound(task_id.to_string()))?;
        row.completed = completed;
        row.completed_at = completed_at;
        Ok(row.clone())
    }

    async fn delete_task(&self, _token: &str, task_id: Uuid) -> PortResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.id != task_id);
        if rows.len() == before {
            return Err(PortError::NotFound(task_id.to_string()));
        }
        Ok(())
    }
}

//=========================================================================================
// Chat model
//=========================================================================================

pub enum ModelBehavior {
    Reply(String),
    Fail,
    Hang,
}

pub struct FakeChatModel {
    pub behavior: ModelBehavior,
    pub seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeChatModel {
    pub fn new(behavior: ModelBehavior) -> Self {
        Self {
            behavior,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatModel for FakeChatModel {
    async fn complete(&self, _system_prompt: &str, messages: &[ChatMessage]) -> PortResult<String> {
        self.seen.lock().unwrap().push(messages.to_vec());
        match &self.behavior {
            ModelBehavior::Reply(text) => Ok(text.clone()),
            ModelBehavior::Fail => Err(PortError::Unexpected("HTTP 500".into())),
            ModelBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("too late".into())
            }
        }
    }

    async fn ping(&self) -> PortResult<()> {
        match &self.behavior {
            ModelBehavior::Reply(_) => Ok(()),
            ModelBehavior::Fail => Err(PortError::Network("unreachable".into())),
            ModelBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            }
        }
    }
}

//=========================================================================================
// Harness
//=========================================================================================

pub struct Harness {
    pub backend: Arc<FakeAuthBackend>,
    pub storage: Arc<MemoryStorage>,
    pub repo: Arc<FakeTaskRepo>,
    pub auth: Arc<AuthManager>,
    pub store: TaskStore,
}

impl Harness {
    pub fn new() -> Self {
        let backend = Arc::new(FakeAuthBackend::default());
        let storage = Arc::new(MemoryStorage::default());
        let repo = Arc::new(FakeTaskRepo::default());
        let auth = Arc::new(AuthManager::new(backend.clone(), storage.clone()));
        let store = TaskStore::new(repo.clone(), auth.clone());
        Self {
            backend,
            storage,
            repo,
            auth,
            store,
        }
    }

    /// A fresh manager over the same backend and storage, as after a page reload.
    pub fn reload(&self) -> AuthManager {
        AuthManager::new(self.backend.clone(), self.storage.clone())
    }

    pub async fn signed_in(&self) -> User {
        self.backend.add_account("Ana", "ana@x.com", "Secret123!");
        self.auth
            .login("ana@x.com", "Secret123!", false)
            .await
            .expect("login succeeds")
    }
}
