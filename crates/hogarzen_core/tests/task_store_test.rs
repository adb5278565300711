//! Integration tests for the task store.

mod common;

use std::sync::atomic::Ordering;

use chrono::{Duration, Utc};
use common::Harness;
use hogarzen_core::catalog::find_template;
use hogarzen_core::notifications::{notify, Severity, UserAction};
use hogarzen_core::validation::field_messages;
use hogarzen_core::{
    AppError, AuthErrorKind, NewTask, PortError, TaskCategory, TaskPriority, UserTask,
};
use uuid::Uuid;

fn plancha() -> NewTask {
    NewTask {
        title: "Apagar la plancha".into(),
        category: "seguridad".into(),
        ..Default::default()
    }
}

fn seeded(user_id: Uuid, title: &str, order: i32, completed: bool) -> UserTask {
    UserTask {
        id: Uuid::new_v4(),
        user_id,
        template_id: None,
        title: title.into(),
        description: None,
        category: TaskCategory::Limpieza,
        priority: TaskPriority::Media,
        completed,
        completed_at: completed.then(Utc::now),
        order,
        created_at: Utc::now() - Duration::days(1),
    }
}

#[tokio::test]
async fn adding_a_task_increases_pending() {
    let h = Harness::new();
    let user = h.signed_in().await;
    h.store.load_tasks(user.id).await.unwrap();
    let before = h.store.summary().await;

    let outcome = h.store.add_task(plancha()).await;
    assert_eq!(notify(UserAction::AddTask, &outcome).severity, Severity::Success);
    let task = outcome.unwrap();

    assert!(!task.completed);
    assert_eq!(task.category, TaskCategory::Seguridad);
    assert_eq!(task.user_id, user.id);
    let after = h.store.summary().await;
    assert_eq!(after.pending, before.pending + 1);
    assert_eq!(after.total, before.total + 1);
}

#[tokio::test]
async fn invalid_candidate_never_reaches_the_backend() {
    let h = Harness::new();
    h.signed_in().await;

    let err = h
        .store
        .add_task(NewTask {
            title: "".into(),
            category: "garaje".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    match err {
        AppError::Validation(errors) => {
            let fields = field_messages(&errors);
            assert!(fields.contains_key("title"));
            assert!(fields.contains_key("category"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(h.repo.insert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn task_mutations_require_a_session() {
    let h = Harness::new();
    let err = h.store.add_task(plancha()).await.unwrap_err();
    assert!(err.is_auth(AuthErrorKind::NotAuthenticated));
    assert_eq!(h.repo.insert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn load_orders_by_order_field_and_accepts_empty() {
    let h = Harness::new();
    let user = h.signed_in().await;
    assert!(h.store.load_tasks(user.id).await.unwrap().is_empty());

    h.repo.seed(seeded(user.id, "segunda", 2, false));
    h.repo.seed(seeded(user.id, "primera", 1, true));
    h.repo.seed(seeded(Uuid::new_v4(), "de otro", 0, false));

    let titles: Vec<String> = h
        .store
        .load_tasks(user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["primera", "segunda"]);

    let summary = h.store.summary().await;
    assert_eq!((summary.total, summary.completed, summary.pending), (2, 1, 1));
}

#[tokio::test]
async fn new_tasks_are_appended_after_existing_order() {
    let h = Harness::new();
    let user = h.signed_in().await;
    h.repo.seed(seeded(user.id, "existente", 4, false));
    h.store.load_tasks(user.id).await.unwrap();

    let template = find_template("regar-plantas").unwrap();
    let task = h.store.add_task(NewTask::from_template(template)).await.unwrap();
    assert_eq!(task.order, 5);
    assert_eq!(task.template_id.as_deref(), Some("regar-plantas"));
    assert_eq!(h.store.tasks().await.last().map(|t| t.id), Some(task.id));
}

#[tokio::test]
async fn toggle_marks_complete_and_back() {
    let h = Harness::new();
    h.signed_in().await;
    let task = h.store.add_task(plancha()).await.unwrap();

    let done = h.store.toggle_complete(task.id).await.unwrap();
    assert!(done.completed);
    assert!(done.completed_at.is_some());
    assert_eq!(h.store.summary().await.completed, 1);

    let reopened = h.store.toggle_complete(task.id).await.unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.completed_at, None);
}

#[tokio::test]
async fn failed_toggle_rolls_back() {
    let h = Harness::new();
    h.signed_in().await;
    let task = h.store.add_task(plancha()).await.unwrap();

    h.repo.fail_next(PortError::Network("timeout".into()));
    let err = h.store.toggle_complete(task.id).await.unwrap_err();

    assert!(matches!(err, AppError::Network(_)));
    let local = h.store.tasks().await;
    let local = local.iter().find(|t| t.id == task.id).unwrap();
    assert_eq!(local.completed, task.completed);
    assert_eq!(local.completed_at, task.completed_at);
    assert!(!h.repo.row(task.id).unwrap().completed);
}

#[tokio::test]
async fn rejected_token_mid_operation_expires_the_session() {
    let h = Harness::new();
    h.signed_in().await;
    let task = h.store.add_task(plancha()).await.unwrap();

    h.repo.fail_next(PortError::Unauthorized);
    let err = h.store.toggle_complete(task.id).await.unwrap_err();

    assert!(err.is_auth(AuthErrorKind::SessionExpired));
    assert!(!h.auth.is_authenticated().await);
    assert!(h.store.tasks().await.is_empty());
}

#[tokio::test]
async fn removing_an_absent_task_is_a_no_op() {
    let h = Harness::new();
    h.signed_in().await;
    h.store.add_task(plancha()).await.unwrap();
    let before = h.store.tasks().await;

    h.store.remove_task(Uuid::new_v4()).await.unwrap();

    assert_eq!(h.store.tasks().await, before);
    assert_eq!(h.repo.delete_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn remove_deletes_remotely_then_locally() {
    let h = Harness::new();
    h.signed_in().await;
    let task = h.store.add_task(plancha()).await.unwrap();

    h.store.remove_task(task.id).await.unwrap();
    assert!(h.store.tasks().await.is_empty());
    assert!(h.repo.row(task.id).is_none());

    // Removing twice is still fine.
    h.store.remove_task(task.id).await.unwrap();
}

#[tokio::test]
async fn remove_tolerates_rows_already_gone_remotely() {
    let h = Harness::new();
    h.signed_in().await;
    let task = h.store.add_task(plancha()).await.unwrap();
    h.repo.remove_row(task.id);

    h.store.remove_task(task.id).await.unwrap();
    assert!(h.store.tasks().await.is_empty());
}

#[tokio::test]
async fn failed_remove_keeps_the_task() {
    let h = Harness::new();
    h.signed_in().await;
    let task = h.store.add_task(plancha()).await.unwrap();

    h.repo.fail_next(PortError::Network("offline".into()));
    assert!(h.store.remove_task(task.id).await.is_err());
    assert_eq!(h.store.tasks().await.len(), 1);
}

#[tokio::test]
async fn writes_in_flight_at_logout_are_discarded() {
    let h = Harness::new();
    h.signed_in().await;
    let gate = h.repo.hold_inserts();

    let (added, ()) = tokio::join!(h.store.add_task(plancha()), async {
        h.auth.logout().await;
        gate.notify_one();
    });

    assert!(added.unwrap_err().is_auth(AuthErrorKind::NotAuthenticated));
    assert!(h.store.tasks().await.is_empty());
    assert_eq!(h.store.summary().await.total, 0);
}

#[tokio::test]
async fn list_is_not_visible_to_the_next_session() {
    let h = Harness::new();
    let user = h.signed_in().await;
    h.store.add_task(plancha()).await.unwrap();

    h.auth.logout().await;
    assert!(h.store.tasks().await.is_empty());

    h.auth.login("ana@x.com", "Secret123!", false).await.unwrap();
    assert!(h.store.tasks().await.is_empty());
    assert_eq!(h.store.load_tasks(user.id).await.unwrap().len(), 1);
}
