//! # vllmsim-core
//!
//! Domain services for the vLLM endpoint simulator. Defines the configuration,
//! the tokenizer facade, the latency model, response-text synthesis, and the
//! LoRA adapter registry that the serving layer builds on.
//!
//! Nothing in this crate touches HTTP; the serving crate
//! (`vllmsim-server`) owns the wire protocol and request lifecycle.

pub mod adapters;
pub mod config;
pub mod latency;
pub mod textgen;
pub mod tokenizer;

pub use adapters::{AdapterError, AdapterRegistry};
pub use config::{Config, ConfigError, LoraModule, Mode};
pub use latency::LatencyModel;
