//! Streamed chunk types for Server-Sent Events responses.
//!
//! The `usage` field is omitted from the wire unless populated; exactly one
//! trailing chunk per stream carries it, and only when the client opted in
//! via `stream_options.include_usage`.

use crate::models::common::Usage;
use serde::Serialize;

/// Incremental chat content.
#[derive(Debug, Serialize)]
pub struct ChatDelta {
    pub role: Option<String>,
    pub content: Option<String>,
}

/// Chat choice carrying a delta instead of a full message.
#[derive(Debug, Serialize)]
pub struct ChatChoiceDelta {
    pub index: usize,
    pub delta: ChatDelta,
    pub finish_reason: Option<String>,
}

/// One frame of a streamed chat completion.
#[derive(Debug, Serialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<ChatChoiceDelta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Text choice carrying the next slice of generated text.
#[derive(Debug, Serialize)]
pub struct TextChunkChoice {
    pub index: usize,
    pub text: String,
    pub finish_reason: Option<String>,
}

/// One frame of a streamed text completion. Shares the `text_completion`
/// object value with the non-streaming response.
#[derive(Debug, Serialize)]
pub struct TextCompletionChunk {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<TextChunkChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::CHAT_COMPLETION_CHUNK_OBJECT;

    #[test]
    fn usage_is_absent_unless_populated() {
        let chunk = ChatCompletionChunk {
            id: "chatcmpl-test".to_string(),
            object: CHAT_COMPLETION_CHUNK_OBJECT.to_string(),
            created: 1,
            model: "m".to_string(),
            choices: vec![],
            usage: None,
        };
        let json = serde_json::to_value(&chunk).unwrap();
        assert!(json.get("usage").is_none());

        let with_usage = ChatCompletionChunk {
            usage: Some(Usage::new(4, 4)),
            ..chunk_with_id("chatcmpl-test")
        };
        let json = serde_json::to_value(&with_usage).unwrap();
        assert_eq!(json["usage"]["total_tokens"], 8);
    }

    fn chunk_with_id(id: &str) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: id.to_string(),
            object: CHAT_COMPLETION_CHUNK_OBJECT.to_string(),
            created: 1,
            model: "m".to_string(),
            choices: vec![],
            usage: None,
        }
    }
}
