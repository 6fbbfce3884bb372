//! Completion request types and the unified request view.
//!
//! Both wire shapes share [`BaseRequest`] (flattened into each), and the
//! rest of the pipeline works against [`CompletionRequest`], which hides the
//! chat/text split behind a small capability surface: model, streaming,
//! usage reporting, prompt token count, echo source, and the completion cap.

use crate::models::common::{ChatMessage, ROLE_USER};
use serde::Deserialize;
use vllmsim_core::tokenizer::token_count;

/// Streaming options, only meaningful when `stream` is set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamOptions {
    #[serde(default)]
    pub include_usage: bool,
}

/// Fields common to chat and text completion requests, including the
/// disaggregated prefill/decode metadata that is passed through untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct BaseRequest {
    /// Base model name or the name of a loaded LoRA adapter.
    pub model: String,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub stream_options: StreamOptions,
    /// True when this request's decode runs on a remote pod, i.e. this is a
    /// prefill-only request.
    #[serde(default)]
    pub do_remote_decode: bool,
    /// True when prefill already happened on a remote pod.
    #[serde(default)]
    pub do_remote_prefill: bool,
    #[serde(default)]
    pub remote_block_ids: Vec<String>,
    #[serde(default)]
    pub remote_engine_id: Option<String>,
    #[serde(default)]
    pub remote_host: Option<String>,
    #[serde(default)]
    pub remote_port: Option<u16>,
}

/// A function a chat request offers to the model.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolFunction {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
}

/// A tool entry in a chat request. Only `function` tools exist today.
#[derive(Debug, Clone, Deserialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: ToolFunction,
}

/// `POST /v1/chat/completions` body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(flatten)]
    pub base: BaseRequest,
    pub messages: Vec<ChatMessage>,
    /// Deprecated alias for `max_completion_tokens`; the latter wins when
    /// both are present.
    #[serde(default)]
    pub max_tokens: Option<i64>,
    #[serde(default)]
    pub max_completion_tokens: Option<i64>,
    #[serde(default)]
    pub tools: Option<Vec<Tool>>,
    /// One of `none`, `auto`, `required`.
    #[serde(default)]
    pub tool_choice: Option<String>,
}

impl ChatCompletionRequest {
    /// Content of the last message with the `user` role, or an empty string.
    pub fn last_user_message(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ROLE_USER)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

/// `POST /v1/completions` body.
#[derive(Debug, Clone, Deserialize)]
pub struct TextCompletionRequest {
    #[serde(flatten)]
    pub base: BaseRequest,
    pub prompt: String,
    #[serde(default)]
    pub max_tokens: Option<i64>,
}

/// Unified view over the two completion request shapes.
#[derive(Debug, Clone)]
pub enum CompletionRequest {
    Chat(ChatCompletionRequest),
    Text(TextCompletionRequest),
}

impl CompletionRequest {
    pub fn base(&self) -> &BaseRequest {
        match self {
            CompletionRequest::Chat(req) => &req.base,
            CompletionRequest::Text(req) => &req.base,
        }
    }

    pub fn model(&self) -> &str {
        &self.base().model
    }

    pub fn is_chat(&self) -> bool {
        matches!(self, CompletionRequest::Chat(_))
    }

    pub fn is_stream(&self) -> bool {
        self.base().stream
    }

    /// Whether the response must carry usage statistics. Non-streaming
    /// responses always do; streams only on request.
    pub fn include_usage(&self) -> bool {
        !self.base().stream || self.base().stream_options.include_usage
    }

    pub fn do_remote_decode(&self) -> bool {
        self.base().do_remote_decode
    }

    pub fn do_remote_prefill(&self) -> bool {
        self.base().do_remote_prefill
    }

    /// Number of prompt tokens: every message content for chat, the prompt
    /// for text.
    pub fn prompt_token_count(&self) -> usize {
        match self {
            CompletionRequest::Chat(req) => req
                .messages
                .iter()
                .map(|m| token_count(&m.content))
                .sum(),
            CompletionRequest::Text(req) => token_count(&req.prompt),
        }
    }

    /// Text echoed back in echo mode.
    pub fn echo_source(&self) -> &str {
        match self {
            CompletionRequest::Chat(req) => req.last_user_message(),
            CompletionRequest::Text(req) => &req.prompt,
        }
    }

    /// Requested completion cap with precedence applied:
    /// `max_completion_tokens` over `max_tokens` for chat, `max_tokens`
    /// for text.
    pub fn max_completion_tokens(&self) -> Option<i64> {
        match self {
            CompletionRequest::Chat(req) => req.max_completion_tokens.or(req.max_tokens),
            CompletionRequest::Text(req) => req.max_tokens,
        }
    }

    /// Every cap the client declared, for sign validation.
    pub fn declared_caps(&self) -> [Option<i64>; 2] {
        match self {
            CompletionRequest::Chat(req) => [req.max_tokens, req.max_completion_tokens],
            CompletionRequest::Text(req) => [req.max_tokens, None],
        }
    }

    /// Tools offered by a chat request; text requests have none.
    pub fn tools(&self) -> Option<&[Tool]> {
        match self {
            CompletionRequest::Chat(req) => req.tools.as_deref(),
            CompletionRequest::Text(_) => None,
        }
    }

    pub fn tool_choice(&self) -> Option<&str> {
        match self {
            CompletionRequest::Chat(req) => req.tool_choice.as_deref(),
            CompletionRequest::Text(_) => None,
        }
    }
}
