//! services/api/src/web/chat.rs
//!
//! Endpoints for the household assistant. Replies never fail: when the model is
//! unreachable the assistant answers with a canned reply.

use axum::{extract::State, Json};
use hogarzen_core::ChatMessage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::ApiError;
use crate::web::state::AppState;

fn not_blank(message: &str) -> Result<(), ValidationError> {
    if message.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Escribe una pregunta".into());
        Err(error)
    } else {
        Ok(())
    }
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct ChatRequest {
    #[validate(custom(function = "not_blank"))]
    pub message: String,
    /// Earlier turns of the conversation, oldest first.
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub history: Vec<ChatMessage>,
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Serialize, ToSchema)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

/// POST /chat - Ask the assistant
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "The assistant's reply", body = ChatResponse),
        (status = 401, description = "Not signed in"),
        (status = 422, description = "Empty message")
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    req.validate()?;
    let reply = state.assistant.send_message(&req.message, &req.history).await;
    Ok(Json(ChatResponse { reply }))
}

/// GET /chat/suggestions - Starter questions for the chat panel
#[utoipa::path(
    get,
    path = "/chat/suggestions",
    responses(
        (status = 200, description = "Suggested questions", body = SuggestionsResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn suggestions_handler(State(state): State<Arc<AppState>>) -> Json<SuggestionsResponse> {
    Json(SuggestionsResponse {
        suggestions: state.assistant.quick_suggestions().await,
    })
}
