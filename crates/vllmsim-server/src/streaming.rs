//! Server-Sent Events emission, paced by the latency model.
//!
//! Frame order per stream: (chat only) a role announcement, one frame per
//! generated token, a final frame carrying `finish_reason`, an optional
//! usage frame, and the `[DONE]` sentinel. Every token after the first is
//! emitted with its leading separator space, so concatenating the deltas
//! reproduces the generated text exactly.
//!
//! A failed send means the client is gone; pacing stops at that boundary
//! and the worker moves on.

use crate::dispatcher::SimContext;
use crate::models::common::{
    Usage, CHAT_COMPLETION_CHUNK_OBJECT, ROLE_ASSISTANT, TEXT_COMPLETION_OBJECT,
};
use crate::models::streaming::{
    ChatChoiceDelta, ChatCompletionChunk, ChatDelta, TextChunkChoice, TextCompletionChunk,
};
use crate::models::CompletionRequest;
use crate::response::{epoch_seconds, request_id};
use axum::response::sse::Event;
use tokio::sync::mpsc;
use vllmsim_core::tokenizer::tokenize;

/// Terminal sentinel of every stream.
pub const DONE_FRAME: &str = "[DONE]";

struct StreamState {
    id: String,
    created: u64,
    model: String,
    is_chat: bool,
}

impl StreamState {
    fn chat_frame(&self, choices: Vec<ChatChoiceDelta>, usage: Option<Usage>) -> Event {
        let chunk = ChatCompletionChunk {
            id: self.id.clone(),
            object: CHAT_COMPLETION_CHUNK_OBJECT.to_string(),
            created: self.created,
            model: self.model.clone(),
            choices,
            usage,
        };
        Event::default().data(serde_json::to_string(&chunk).unwrap())
    }

    fn text_frame(&self, choices: Vec<TextChunkChoice>, usage: Option<Usage>) -> Event {
        let chunk = TextCompletionChunk {
            id: self.id.clone(),
            object: TEXT_COMPLETION_OBJECT.to_string(),
            created: self.created,
            model: self.model.clone(),
            choices,
            usage,
        };
        Event::default().data(serde_json::to_string(&chunk).unwrap())
    }

    /// Chat-only opener announcing the assistant role without content.
    fn role_frame(&self) -> Event {
        self.chat_frame(
            vec![ChatChoiceDelta {
                index: 0,
                delta: ChatDelta {
                    role: Some(ROLE_ASSISTANT.to_string()),
                    content: None,
                },
                finish_reason: None,
            }],
            None,
        )
    }

    fn content_frame(&self, content: String) -> Event {
        if self.is_chat {
            self.chat_frame(
                vec![ChatChoiceDelta {
                    index: 0,
                    delta: ChatDelta {
                        role: None,
                        content: Some(content),
                    },
                    finish_reason: None,
                }],
                None,
            )
        } else {
            self.text_frame(
                vec![TextChunkChoice {
                    index: 0,
                    text: content,
                    finish_reason: None,
                }],
                None,
            )
        }
    }

    /// Final content frame: `finish_reason` set, empty delta.
    fn finish_frame(&self, finish_reason: &str) -> Event {
        if self.is_chat {
            self.chat_frame(
                vec![ChatChoiceDelta {
                    index: 0,
                    delta: ChatDelta {
                        role: None,
                        content: None,
                    },
                    finish_reason: Some(finish_reason.to_string()),
                }],
                None,
            )
        } else {
            self.text_frame(
                vec![TextChunkChoice {
                    index: 0,
                    text: String::new(),
                    finish_reason: Some(finish_reason.to_string()),
                }],
                None,
            )
        }
    }

    /// Trailing frame with populated usage and no choices.
    fn usage_frame(&self, usage: Usage) -> Event {
        if self.is_chat {
            self.chat_frame(vec![], Some(usage))
        } else {
            self.text_frame(vec![], Some(usage))
        }
    }
}

/// Emit one complete streamed response into `frames`.
pub(crate) async fn emit(
    ctx: &SimContext,
    request: &CompletionRequest,
    prompt_tokens: usize,
    text: &str,
    finish_reason: &str,
    frames: mpsc::Sender<Event>,
) {
    let state = StreamState {
        id: request_id(request.is_chat()),
        created: epoch_seconds(),
        model: request.model().to_string(),
        is_chat: request.is_chat(),
    };
    let tokens = tokenize(text);

    let ttft = ctx.latency.time_to_first_token(request.do_remote_prefill());
    if !sleep_or_abort(ttft, &frames).await {
        return;
    }

    if state.is_chat && frames.send(state.role_frame()).await.is_err() {
        return;
    }

    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && !sleep_or_abort(ctx.latency.inter_token_latency(), &frames).await {
            return;
        }
        let content = if i == 0 {
            (*token).to_string()
        } else {
            format!(" {token}")
        };
        if frames.send(state.content_frame(content)).await.is_err() {
            return;
        }
    }

    if frames.send(state.finish_frame(finish_reason)).await.is_err() {
        return;
    }

    if request.include_usage() {
        let usage = Usage::new(prompt_tokens, tokens.len());
        if frames.send(state.usage_frame(usage)).await.is_err() {
            return;
        }
    }

    let _ = frames.send(Event::default().data(DONE_FRAME)).await;
}

/// Sleep for `delay`, returning false if the client disconnects first.
async fn sleep_or_abort(delay: std::time::Duration, frames: &mpsc::Sender<Event>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = frames.closed() => {
            tracing::debug!("client went away mid-stream");
            false
        }
    }
}
