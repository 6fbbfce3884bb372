//! Non-streaming response assembly.
//!
//! The unary path charges the whole generation wall time as one sleep
//! (time to first token plus an inter-token draw for every remaining token)
//! before the body is written, so a non-streaming client observes the same
//! end-to-end latency a streaming client would.

use crate::dispatcher::SimContext;
use crate::models::common::{
    Usage, CHAT_COMPLETION_OBJECT, ROLE_ASSISTANT, TEXT_COMPLETION_OBJECT,
};
use crate::models::response::{
    ChatChoice, ChatCompletionResponse, CompletionResponse, RemoteEcho, TextChoice,
    TextCompletionResponse,
};
use crate::models::{ChatMessage, CompletionRequest};
use chrono::Utc;
use tokio::sync::oneshot;
use uuid::Uuid;
use vllmsim_core::tokenizer::token_count;

/// Opaque request id: `chatcmpl-…` for chat, `cmpl-…` for text.
pub(crate) fn request_id(is_chat: bool) -> String {
    let prefix = if is_chat { "chatcmpl" } else { "cmpl" };
    format!("{prefix}-{}", Uuid::new_v4())
}

pub(crate) fn epoch_seconds() -> u64 {
    Utc::now().timestamp() as u64
}

/// Build the wire body for a finished generation.
pub(crate) fn build_response(
    request: &CompletionRequest,
    prompt_tokens: usize,
    text: &str,
    finish_reason: &str,
) -> CompletionResponse {
    let usage = Usage::new(prompt_tokens, token_count(text));
    let remote = RemoteEcho::from_base(request.base());
    if request.is_chat() {
        CompletionResponse::Chat(ChatCompletionResponse {
            id: request_id(true),
            object: CHAT_COMPLETION_OBJECT.to_string(),
            created: epoch_seconds(),
            model: request.model().to_string(),
            choices: vec![ChatChoice {
                index: 0,
                message: ChatMessage {
                    role: ROLE_ASSISTANT.to_string(),
                    content: text.to_string(),
                },
                finish_reason: finish_reason.to_string(),
            }],
            usage,
            remote,
        })
    } else {
        CompletionResponse::Text(TextCompletionResponse {
            id: request_id(false),
            object: TEXT_COMPLETION_OBJECT.to_string(),
            created: epoch_seconds(),
            model: request.model().to_string(),
            choices: vec![TextChoice {
                index: 0,
                text: text.to_string(),
                finish_reason: finish_reason.to_string(),
            }],
            usage,
            remote,
        })
    }
}

/// Pace, build, and deliver a unary response. Aborts the sleep if the
/// client goes away first.
pub(crate) async fn respond_unary(
    ctx: &SimContext,
    request: &CompletionRequest,
    prompt_tokens: usize,
    text: &str,
    finish_reason: &str,
    mut reply: oneshot::Sender<CompletionResponse>,
) {
    let tokens = token_count(text);
    let delay = ctx.latency.time_to_first_token(request.do_remote_prefill())
        + ctx
            .latency
            .total_inter_token_latency(tokens.saturating_sub(1));

    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = reply.closed() => {
            tracing::debug!(model = request.model(), "client went away before the response");
            return;
        }
    }

    let body = build_response(request, prompt_tokens, text, finish_reason);
    let _ = reply.send(body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use vllmsim_core::textgen::FINISH_STOP;

    fn chat_request(body: &str) -> CompletionRequest {
        CompletionRequest::Chat(serde_json::from_str(body).unwrap())
    }

    #[test]
    fn chat_body_matches_the_wire_shape() {
        let request = chat_request(
            r#"{"model": "my_model", "messages": [{"role": "user", "content": "This is a test."}]}"#,
        );
        let response = build_response(&request, 4, "This is a test.", FINISH_STOP);
        let json = match response {
            CompletionResponse::Chat(body) => serde_json::to_value(&body).unwrap(),
            CompletionResponse::Text(_) => panic!("expected a chat response"),
        };

        assert!(json["id"].as_str().unwrap().starts_with("chatcmpl-"));
        assert_eq!(json["object"], "chat.completion");
        assert_eq!(json["model"], "my_model");
        assert_eq!(json["choices"][0]["message"]["role"], "assistant");
        assert_eq!(json["choices"][0]["message"]["content"], "This is a test.");
        assert_eq!(json["choices"][0]["finish_reason"], "stop");
        assert_eq!(json["usage"]["prompt_tokens"], 4);
        assert_eq!(json["usage"]["completion_tokens"], 4);
        assert_eq!(json["usage"]["total_tokens"], 8);
    }

    #[test]
    fn text_body_uses_the_text_completion_object() {
        let request = CompletionRequest::Text(
            serde_json::from_str(r#"{"model": "my_model", "prompt": "hello there"}"#).unwrap(),
        );
        let response = build_response(&request, 2, "hello there", FINISH_STOP);
        let json = match response {
            CompletionResponse::Text(body) => serde_json::to_value(&body).unwrap(),
            CompletionResponse::Chat(_) => panic!("expected a text response"),
        };

        assert!(json["id"].as_str().unwrap().starts_with("cmpl-"));
        assert_eq!(json["object"], "text_completion");
        assert_eq!(json["choices"][0]["text"], "hello there");
        assert_eq!(json["usage"]["total_tokens"], 4);
    }

    #[test]
    fn prefill_requests_echo_remote_metadata() {
        let request = CompletionRequest::Text(
            serde_json::from_str(
                r#"{
                    "model": "my_model",
                    "prompt": "hi",
                    "do_remote_decode": true,
                    "remote_block_ids": ["b1"],
                    "remote_engine_id": "engine-0"
                }"#,
            )
            .unwrap(),
        );
        let response = build_response(&request, 1, "hi", FINISH_STOP);
        let json = match response {
            CompletionResponse::Text(body) => serde_json::to_value(&body).unwrap(),
            CompletionResponse::Chat(_) => panic!("expected a text response"),
        };
        assert_eq!(json["do_remote_decode"], true);
        assert_eq!(json["remote_block_ids"][0], "b1");
        assert_eq!(json["remote_engine_id"], "engine-0");
    }
}
