//! OpenAI/vLLM-compatible request and response types.

pub mod admin;
pub mod common;
pub mod request;
pub mod response;
pub mod streaming;

pub use common::{ChatMessage, Usage};
pub use request::{
    ChatCompletionRequest, CompletionRequest, TextCompletionRequest,
};
pub use response::{ChatCompletionResponse, CompletionResponse, TextCompletionResponse};
pub use streaming::{ChatCompletionChunk, TextCompletionChunk};
