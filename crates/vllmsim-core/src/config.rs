//! Simulator configuration.
//!
//! Built once from command-line flags at startup and immutable afterwards.
//! Latency knobs are in milliseconds; a standard deviation of zero disables
//! jitter for that knob.

use clap::ValueEnum;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

/// Response synthesis strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Reflect the request's input back (last user message or prompt).
    Echo,
    /// Emit plausible synthetic text from a preset bank.
    Random,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Echo => write!(f, "echo"),
            Mode::Random => write!(f, "random"),
        }
    }
}

/// A LoRA adapter declared at startup via `--lora-modules`.
///
/// Statically-declared adapters are always servable and are never evicted
/// from the registry. Only `name` is required; `path` is accepted for
/// vLLM flag compatibility and otherwise ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoraModule {
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// Errors detected while validating a [`Config`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("model name must not be empty")]
    EmptyModel,
    #[error("max-num-seqs must be at least 1")]
    NoWorkers,
    #[error("max-loras must be at least 1")]
    NoLoraCapacity,
    #[error("duplicate LoRA module name '{0}'")]
    DuplicateLora(String),
}

/// Immutable server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base model name reported and accepted by the API.
    pub model: String,
    /// LoRA adapters servable from startup.
    pub lora_modules: Vec<LoraModule>,
    /// Capacity of the dynamically-loaded adapter set.
    pub max_loras: usize,
    /// Worker count and admission-queue bound.
    pub max_num_seqs: usize,
    /// Maximum prompt + completion tokens per request. Zero disables the check.
    pub max_model_len: usize,
    /// Response synthesis strategy.
    pub mode: Mode,
    /// Listen port.
    pub port: u16,
    /// Mean time to first token, in milliseconds.
    pub time_to_first_token: u64,
    pub time_to_first_token_std_dev: u64,
    /// Mean delay between streamed tokens, in milliseconds.
    pub inter_token_latency: u64,
    pub inter_token_latency_std_dev: u64,
    /// TTFT replacement when prefill happened on a remote peer, in milliseconds.
    pub kv_cache_transfer_latency: u64,
    pub kv_cache_transfer_latency_std_dev: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: String::new(),
            lora_modules: Vec::new(),
            max_loras: 1,
            max_num_seqs: 5,
            max_model_len: 1024,
            mode: Mode::Random,
            port: 8000,
            time_to_first_token: 0,
            time_to_first_token_std_dev: 0,
            inter_token_latency: 0,
            inter_token_latency_std_dev: 0,
            kv_cache_transfer_latency: 0,
            kv_cache_transfer_latency_std_dev: 0,
        }
    }
}

impl Config {
    /// Check the invariants the rest of the system assumes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if self.max_num_seqs == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.max_loras == 0 {
            return Err(ConfigError::NoLoraCapacity);
        }
        let mut seen = HashSet::new();
        for module in &self.lora_modules {
            if !seen.insert(module.name.as_str()) {
                return Err(ConfigError::DuplicateLora(module.name.clone()));
            }
        }
        Ok(())
    }

    /// Names of the statically-declared adapters, in declaration order.
    pub fn lora_names(&self) -> Vec<String> {
        self.lora_modules.iter().map(|m| m.name.clone()).collect()
    }
}
