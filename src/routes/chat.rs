use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse},
    services::prompt_builder::build_system_prompt,
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Rejected chat request body");
        AppError::Validation(rejection.body_text())
    })?;

    let message = match payload.message.as_deref() {
        Some(m) if !m.is_empty() => m,
        _ => return Err(AppError::Validation("Message is required".to_string())),
    };

    if !state.config.is_ai_configured() {
        return Err(AppError::Configuration);
    }

    let system_prompt = build_system_prompt(payload.user_context.as_ref());
    tracing::debug!(prompt_len = system_prompt.len(), "Built system prompt");

    let client = state.completion_client().await?;
    let reply = client.complete(&system_prompt, message).await?;

    Ok(Json(ChatResponse { reply }))
}
