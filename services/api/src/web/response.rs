//! services/api/src/web/response.rs
//!
//! The envelope for responses to user actions.

use axum::Json;
use hogarzen_core::notifications::notify;
use hogarzen_core::{AppResult, Toast, UserAction};
use serde::Serialize;

use crate::error::ApiError;

/// Every user action answers with exactly one toast, success or failure.
#[derive(Debug, Serialize)]
pub struct ActionResponse<T: Serialize> {
    pub data: T,
    pub toast: Toast,
}

pub type ActionResult<T> = Result<Json<ActionResponse<T>>, ApiError>;

/// Wraps an action outcome: the success toast on `Ok`, the classified error otherwise.
pub fn respond<T: Serialize>(action: UserAction, outcome: AppResult<T>) -> ActionResult<T> {
    let toast = notify(action, &outcome);
    outcome
        .map(|data| Json(ActionResponse { data, toast }))
        .map_err(ApiError::App)
}
