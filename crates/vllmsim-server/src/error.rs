//! HTTP error handling and response mapping.
//!
//! Every failure is rendered as the OpenAI error envelope:
//! `{"error": {"message": "...", "type": "...", "code": <status>}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use vllmsim_core::AdapterError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("The model `{0}` does not exist.")]
    ModelNotFound(String),

    #[error("Max completion tokens and max tokens should be positive")]
    InvalidMaxTokens,

    #[error(
        "This model's maximum context length is {max_model_len} tokens. \
         However, you requested {requested} tokens ({prompt_tokens} in the messages, \
         {completion_tokens} in the completion). \
         Please reduce the length of the messages or completion."
    )]
    ContextWindowExceeded {
        max_model_len: usize,
        requested: usize,
        prompt_tokens: usize,
        completion_tokens: usize,
    },

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("the server is shutting down")]
    QueueShuttingDown,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status and OpenAI error type for this failure.
    pub fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::ModelNotFound(_) => (StatusCode::NOT_FOUND, "NotFoundError"),
            ServerError::InvalidMaxTokens
            | ServerError::ContextWindowExceeded { .. }
            | ServerError::Adapter(_) => (StatusCode::BAD_REQUEST, "BadRequestError"),
            ServerError::QueueShuttingDown => {
                (StatusCode::SERVICE_UNAVAILABLE, "ServiceUnavailableError")
            }
            ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError")
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();
        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": error_type,
                "code": status.as_u16(),
            }
        }));
        (status, body).into_response()
    }
}
