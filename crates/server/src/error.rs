use assistant::AssistantError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const INVALID_MESSAGE: &str = "Mensaje inválido. Envía un texto no vacío.";
pub const INTERNAL_ERROR: &str = "Ocurrió un error interno. Intenta de nuevo más tarde.";

/// Error surface of the JSON routes. Infrastructure failures map to a
/// generic 500 body; detail goes to the logs only.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Not Found: {0}")]
    NotFound(String),
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, String) {
        match self {
            ApiError::Database(err) => {
                tracing::error!("database error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
            }
            ApiError::Assistant(AssistantError::EmptyMessage) => {
                (StatusCode::BAD_REQUEST, INVALID_MESSAGE.to_string())
            }
            ApiError::Assistant(AssistantError::Store(err)) => {
                tracing::error!("store error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
            }
            // Conversational errors are converted to replies before they get
            // here; anything left is an internal misuse.
            ApiError::Assistant(err) => {
                tracing::error!("unexpected assistant error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_body();
        (status, Json(json!({ "error": message }))).into_response()
    }
}
