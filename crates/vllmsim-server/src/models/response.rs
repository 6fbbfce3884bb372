//! Non-streaming completion response types.

use crate::models::common::Usage;
use crate::models::request::BaseRequest;
use crate::models::ChatMessage;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Chat completion choice.
#[derive(Debug, Serialize)]
pub struct ChatChoice {
    pub index: usize,
    pub message: ChatMessage,
    pub finish_reason: String,
}

/// `POST /v1/chat/completions` response body.
#[derive(Debug, Serialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
    pub usage: Usage,
    #[serde(flatten)]
    pub remote: Option<RemoteEcho>,
}

/// Text completion choice.
#[derive(Debug, Serialize)]
pub struct TextChoice {
    pub index: usize,
    pub text: String,
    pub finish_reason: String,
}

/// `POST /v1/completions` response body.
#[derive(Debug, Serialize)]
pub struct TextCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<TextChoice>,
    pub usage: Usage,
    #[serde(flatten)]
    pub remote: Option<RemoteEcho>,
}

/// Disaggregated prefill/decode metadata echoed back on prefill-only
/// responses.
#[derive(Debug, Serialize)]
pub struct RemoteEcho {
    pub do_remote_decode: bool,
    pub do_remote_prefill: bool,
    pub remote_block_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_engine_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_port: Option<u16>,
}

impl RemoteEcho {
    /// Echo for a prefill-only request; `None` for everything else.
    pub fn from_base(base: &BaseRequest) -> Option<Self> {
        if !base.do_remote_decode {
            return None;
        }
        Some(Self {
            do_remote_decode: base.do_remote_decode,
            do_remote_prefill: base.do_remote_prefill,
            remote_block_ids: base.remote_block_ids.clone(),
            remote_engine_id: base.remote_engine_id.clone(),
            remote_host: base.remote_host.clone(),
            remote_port: base.remote_port,
        })
    }
}

/// A finished unary response, handed from a worker back to the handler.
#[derive(Debug)]
pub enum CompletionResponse {
    Chat(ChatCompletionResponse),
    Text(TextCompletionResponse),
}

impl IntoResponse for CompletionResponse {
    fn into_response(self) -> Response {
        match self {
            CompletionResponse::Chat(body) => Json(body).into_response(),
            CompletionResponse::Text(body) => Json(body).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::CHAT_COMPLETION_OBJECT;

    #[test]
    fn remote_echo_only_for_prefill_requests() {
        let base: BaseRequest = serde_json::from_str(r#"{"model": "m"}"#).unwrap();
        assert!(RemoteEcho::from_base(&base).is_none());

        let prefill: BaseRequest = serde_json::from_str(
            r#"{"model": "m", "do_remote_decode": true, "remote_block_ids": ["b1"]}"#,
        )
        .unwrap();
        let echo = RemoteEcho::from_base(&prefill).unwrap();
        assert_eq!(echo.remote_block_ids, vec!["b1"]);
    }

    #[test]
    fn remote_fields_flatten_into_the_body() {
        let response = ChatCompletionResponse {
            id: "chatcmpl-test".to_string(),
            object: CHAT_COMPLETION_OBJECT.to_string(),
            created: 1,
            model: "m".to_string(),
            choices: vec![],
            usage: Usage::new(1, 1),
            remote: Some(RemoteEcho {
                do_remote_decode: true,
                do_remote_prefill: false,
                remote_block_ids: vec!["b1".to_string()],
                remote_engine_id: None,
                remote_host: None,
                remote_port: None,
            }),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["do_remote_decode"], true);
        assert_eq!(json["remote_block_ids"][0], "b1");
        assert!(json.get("remote_engine_id").is_none());
    }

    #[test]
    fn plain_responses_carry_no_remote_fields() {
        let response = ChatCompletionResponse {
            id: "chatcmpl-test".to_string(),
            object: CHAT_COMPLETION_OBJECT.to_string(),
            created: 1,
            model: "m".to_string(),
            choices: vec![],
            usage: Usage::new(1, 1),
            remote: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("do_remote_decode").is_none());
    }
}
