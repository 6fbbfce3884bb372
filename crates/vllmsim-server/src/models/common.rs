//! Types and constants shared by the chat and text completion APIs.

use serde::{Deserialize, Serialize};

/// `object` value of a non-streaming chat completion.
pub const CHAT_COMPLETION_OBJECT: &str = "chat.completion";
/// `object` value of a streamed chat completion chunk.
pub const CHAT_COMPLETION_CHUNK_OBJECT: &str = "chat.completion.chunk";
/// `object` value of a text completion, streaming or not.
pub const TEXT_COMPLETION_OBJECT: &str = "text_completion";

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

impl Usage {
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_totals_prompt_and_completion() {
        let usage = Usage::new(4, 4);
        assert_eq!(usage.total_tokens, 8);
    }
}
