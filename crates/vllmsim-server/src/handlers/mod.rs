//! HTTP request handlers for API endpoints.

pub mod completions;
pub mod health;
pub mod lora;
pub mod models;

pub use completions::{handle_chat_completion, handle_text_completion};
pub use health::{handle_health, handle_ready};
pub use lora::{handle_load_lora, handle_unload_lora};
pub use models::handle_list_models;
