//! # vllmsim-server
//!
//! OpenAI/vLLM-compatible HTTP surface for the inference simulator.
//!
//! Requests are validated in the handler, published to a bounded worker
//! pool sized by `max-num-seqs`, and answered either as a single JSON body
//! or as a paced SSE token stream. No model runs anywhere; latencies and
//! text come from `vllmsim-core`.

pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod models;
pub mod response;
pub mod server;
pub mod state;
pub mod streaming;
pub mod validation;

pub use error::ServerError;
pub use server::{create_router, run_server};
pub use state::AppState;
