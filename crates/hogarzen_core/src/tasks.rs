//! crates/hogarzen_core/src/tasks.rs
//!
//! The Task Store: the in-memory checklist of the signed-in user, kept in sync
//! with the hosted task table through `TaskRepository`.
//!
//! State changes are expressed as pure functions on `TaskList` that return a new
//! list. Completion toggles are two-phase (`OptimisticUpdate`): applied locally,
//! then confirmed remotely or reverted.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::{AuthManager, SessionTicket};
use crate::domain::{NewTask, NewTaskRow, TaskSummary, UserTask};
use crate::error::{AppError, AppResult, AuthErrorKind};
use crate::ports::{PortError, TaskRepository};
use crate::validation::validate_new_task;

//=========================================================================================
// Pure State
//=========================================================================================

/// An ordered, immutable snapshot of a user's tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<UserTask>,
}

impl TaskList {
    /// Builds a list ordered by `order`, then creation time.
    pub fn sorted(mut tasks: Vec<UserTask>) -> Self {
        tasks.sort_by(|a, b| a.order.cmp(&b.order).then(a.created_at.cmp(&b.created_at)));
        Self { tasks }
    }

    pub fn tasks(&self) -> &[UserTask] {
        &self.tasks
    }

    pub fn get(&self, task_id: Uuid) -> Option<&UserTask> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn next_order(&self) -> i32 {
        self.tasks
            .iter()
            .map(|task| task.order)
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }

    pub fn with_task(&self, task: UserTask) -> Self {
        let mut tasks: Vec<UserTask> = self
            .tasks
            .iter()
            .filter(|existing| existing.id != task.id)
            .cloned()
            .collect();
        tasks.push(task);
        Self::sorted(tasks)
    }

    /// Replaces a task in place; unknown ids leave the list unchanged.
    pub fn with_replaced(&self, task: UserTask) -> Self {
        let tasks = self
            .tasks
            .iter()
            .map(|existing| {
                if existing.id == task.id {
                    task.clone()
                } else {
                    existing.clone()
                }
            })
            .collect();
        Self::sorted(tasks)
    }

    pub fn without(&self, task_id: Uuid) -> Self {
        Self {
            tasks: self
                .tasks
                .iter()
                .filter(|task| task.id != task_id)
                .cloned()
                .collect(),
        }
    }

    pub fn summary(&self) -> TaskSummary {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        let completion_rate = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        };
        TaskSummary {
            total,
            completed,
            pending: total - completed,
            completion_rate,
        }
    }
}

/// Flips completion, stamping or clearing `completed_at`.
pub fn toggled(task: &UserTask, now: DateTime<Utc>) -> UserTask {
    let completed = !task.completed;
    UserTask {
        completed,
        completed_at: completed.then_some(now),
        ..task.clone()
    }
}

/// A local change that is applied before the backend confirms it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticUpdate {
    pub previous: UserTask,
    pub applied: UserTask,
}

impl OptimisticUpdate {
    pub fn toggle(task: &UserTask, now: DateTime<Utc>) -> Self {
        Self {
            previous: task.clone(),
            applied: toggled(task, now),
        }
    }

    pub fn apply(&self, list: &TaskList) -> TaskList {
        list.with_replaced(self.applied.clone())
    }

    /// The backend's copy wins over the optimistic one.
    pub fn confirm(&self, list: &TaskList, confirmed: UserTask) -> TaskList {
        list.with_replaced(confirmed)
    }

    pub fn revert(&self, list: &TaskList) -> TaskList {
        list.with_replaced(self.previous.clone())
    }
}

//=========================================================================================
// TaskStore
//=========================================================================================

#[derive(Debug, Default)]
struct StoreState {
    /// The session generation `list` was loaded under.
    generation: u64,
    list: TaskList,
}

pub struct TaskStore {
    repo: Arc<dyn TaskRepository>,
    auth: Arc<AuthManager>,
    state: RwLock<StoreState>,
}

impl TaskStore {
    pub fn new(repo: Arc<dyn TaskRepository>, auth: Arc<AuthManager>) -> Self {
        Self {
            repo,
            auth,
            state: RwLock::new(StoreState::default()),
        }
    }

    async fn active_ticket(&self) -> AppResult<SessionTicket> {
        self.auth
            .ticket()
            .await
            .ok_or(AppError::Auth(AuthErrorKind::NotAuthenticated))
    }

    async fn snapshot(&self, ticket: &SessionTicket) -> TaskList {
        let state = self.state.read().await;
        if state.generation == ticket.generation {
            state.list.clone()
        } else {
            TaskList::default()
        }
    }

    /// Applies `change` to the list, unless the session the work started under has ended.
    async fn commit<F>(&self, ticket: &SessionTicket, change: F) -> AppResult<()>
    where
        F: FnOnce(&TaskList) -> TaskList,
    {
        let mut state = self.state.write().await;
        if !self.auth.is_current(ticket).await {
            debug!("Discarding task update from an ended session");
            return Err(AppError::Auth(AuthErrorKind::NotAuthenticated));
        }
        if state.generation != ticket.generation {
            state.generation = ticket.generation;
            state.list = TaskList::default();
        }
        state.list = change(&state.list);
        Ok(())
    }

    async fn remote_failure(&self, operation: &str, err: PortError) -> AppError {
        if err == PortError::Unauthorized {
            warn!(operation, "Backend rejected the session token");
            self.auth.expire_session().await;
            return AppError::Auth(AuthErrorKind::SessionExpired);
        }
        error!(operation, error = %err, "Task backend call failed");
        err.into()
    }

    // --- Operations ---

    pub async fn load_tasks(&self, user_id: Uuid) -> AppResult<Vec<UserTask>> {
        let ticket = self.active_ticket().await?;
        if ticket.user_id != user_id {
            return Err(AppError::Auth(AuthErrorKind::NotAuthenticated));
        }

        let rows = match self.repo.list_tasks(&ticket.token, user_id).await {
            Ok(rows) => rows,
            Err(e) => return Err(self.remote_failure("load_tasks", e).await),
        };
        let list = TaskList::sorted(rows);
        let tasks = list.tasks().to_vec();
        self.commit(&ticket, |_| list).await?;
        debug!(count = tasks.len(), "Tasks loaded");
        Ok(tasks)
    }

    pub async fn add_task(&self, candidate: NewTask) -> AppResult<UserTask> {
        let category = validate_new_task(&candidate)?;
        let ticket = self.active_ticket().await?;

        let row = NewTaskRow {
            user_id: ticket.user_id,
            template_id: candidate.template_id,
            title: candidate.title.trim().to_string(),
            description: candidate
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            category,
            priority: candidate.priority.unwrap_or_default(),
            completed: false,
            order: self.snapshot(&ticket).await.next_order(),
        };

        let created = match self.repo.insert_task(&ticket.token, row).await {
            Ok(created) => created,
            Err(e) => return Err(self.remote_failure("add_task", e).await),
        };
        self.commit(&ticket, |list| list.with_task(created.clone()))
            .await?;
        info!(task_id = %created.id, "Task added");
        Ok(created)
    }

    pub async fn toggle_complete(&self, task_id: Uuid) -> AppResult<UserTask> {
        let ticket = self.active_ticket().await?;
        let current = self
            .snapshot(&ticket)
            .await
            .get(task_id)
            .cloned()
            .ok_or_else(|| AppError::Unknown(format!("task {task_id} is not in the list")))?;

        let update = OptimisticUpdate::toggle(&current, Utc::now());
        self.commit(&ticket, |list| update.apply(list)).await?;

        let confirmed = self
            .repo
            .set_completion(
                &ticket.token,
                task_id,
                update.applied.completed,
                update.applied.completed_at,
            )
            .await;

        match confirmed {
            Ok(confirmed) => {
                self.commit(&ticket, |list| update.confirm(list, confirmed.clone()))
                    .await?;
                info!(%task_id, completed = confirmed.completed, "Task toggled");
                Ok(confirmed)
            }
            Err(e) => {
                // A revert into an ended session is dropped along with the list.
                let _ = self.commit(&ticket, |list| update.revert(list)).await;
                Err(self.remote_failure("toggle_complete", e).await)
            }
        }
    }

    /// Removing an id that is not in the list is a no-op.
    pub async fn remove_task(&self, task_id: Uuid) -> AppResult<()> {
        let ticket = self.active_ticket().await?;
        if self.snapshot(&ticket).await.get(task_id).is_none() {
            debug!(%task_id, "Task already absent; nothing to remove");
            return Ok(());
        }

        match self.repo.delete_task(&ticket.token, task_id).await {
            Ok(()) | Err(PortError::NotFound(_)) => {}
            Err(e) => return Err(self.remote_failure("remove_task", e).await),
        }
        self.commit(&ticket, |list| list.without(task_id)).await?;
        info!(%task_id, "Task removed");
        Ok(())
    }

    /// Current list; empty when no session is active or the list belongs to an ended one.
    pub async fn tasks(&self) -> Vec<UserTask> {
        match self.auth.ticket().await {
            Some(ticket) => self.snapshot(&ticket).await.tasks().to_vec(),
            None => Vec::new(),
        }
    }

    pub async fn summary(&self) -> TaskSummary {
        match self.auth.ticket().await {
            Some(ticket) => self.snapshot(&ticket).await.summary(),
            None => TaskSummary::default(),
        }
    }
}
