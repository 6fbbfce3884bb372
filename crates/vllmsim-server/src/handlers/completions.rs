//! Chat and text completion handlers, the two main serving paths.
//!
//! Both run the same pipeline: validate synchronously, publish a work item
//! to the dispatcher (blocking while the queue is full), then either await
//! the worker's finished body or hand the client an SSE stream the worker
//! feeds.

use crate::dispatcher::{Responder, WorkItem};
use crate::error::ServerError;
use crate::models::{ChatCompletionRequest, CompletionRequest, TextCompletionRequest};
use crate::state::AppState;
use crate::validation;
use axum::extract::State;
use axum::response::sse::{KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use std::convert::Infallible;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;

/// Frames buffered between a worker and a slow client before the worker's
/// send blocks.
const STREAM_BUFFER: usize = 16;

/// Handle `POST /v1/chat/completions`.
pub async fn handle_chat_completion(
    State(state): State<AppState>,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Response, ServerError> {
    dispatch(state, CompletionRequest::Chat(request)).await
}

/// Handle `POST /v1/completions`.
pub async fn handle_text_completion(
    State(state): State<AppState>,
    Json(request): Json<TextCompletionRequest>,
) -> Result<Response, ServerError> {
    dispatch(state, CompletionRequest::Text(request)).await
}

async fn dispatch(state: AppState, request: CompletionRequest) -> Result<Response, ServerError> {
    let validated = validation::validate(&request, &state.config, &state.adapters)?;
    tracing::debug!(
        model = request.model(),
        stream = request.is_stream(),
        prompt_tokens = validated.prompt_tokens,
        completion_cap = validated.completion_cap,
        "admitting request"
    );

    if request.is_stream() {
        let (frames, rx) = mpsc::channel(STREAM_BUFFER);
        state
            .dispatcher
            .submit(WorkItem {
                request,
                validated,
                responder: Responder::Stream(frames),
                enqueued_at: Instant::now(),
            })
            .await?;
        let stream = ReceiverStream::new(rx).map(Ok::<_, Infallible>);
        Ok(Sse::new(stream)
            .keep_alive(KeepAlive::default())
            .into_response())
    } else {
        let (reply, rx) = oneshot::channel();
        state
            .dispatcher
            .submit(WorkItem {
                request,
                validated,
                responder: Responder::Unary(reply),
                enqueued_at: Instant::now(),
            })
            .await?;
        let body = rx.await.map_err(|_| ServerError::QueueShuttingDown)?;
        Ok(body.into_response())
    }
}
