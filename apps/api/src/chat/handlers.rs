//! Axum route handlers for the chat widget.

use axum::{extract::State, Json};

use crate::chat::orchestrator::{ChatRequest, ChatResponse};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /chat
///
/// Translates the conversation, then either returns a matching resume example
/// (`include_example = true`) or a generated reply in the display language.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let response = state.chat.run(request).await?;
    Ok(Json(response))
}
