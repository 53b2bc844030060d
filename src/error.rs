// src/error.rs
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::message::ErrorResponse;
use crate::services::completion::CompletionError;

pub const GENERIC_ERROR: &str = "An error occurred while processing your request";
pub const NOT_CONFIGURED: &str = "AI service is not configured";

#[derive(Debug, Error)]
pub enum AppError {
    /// Caller sent something we cannot use (400).
    #[error("{0}")]
    Validation(String),
    /// No API key for the completion service (500).
    #[error("AI service is not configured")]
    Configuration,
    /// Anything that went wrong talking to the completion service (500).
    #[error(transparent)]
    Upstream(#[from] CompletionError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Configuration => {
                tracing::error!("OPENAI_API_KEY is not set");
                (StatusCode::INTERNAL_SERVER_ERROR, NOT_CONFIGURED.to_string())
            }
            AppError::Upstream(err) => {
                tracing::error!(error = %err, "Error in chat completion");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR.to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
