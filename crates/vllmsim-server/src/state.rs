//! Application state shared across handlers.

use crate::dispatcher::Dispatcher;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use vllmsim_core::{AdapterRegistry, Config};

/// Shared state: immutable configuration, the adapter registry, and the
/// handle into the worker pool.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub adapters: Arc<AdapterRegistry>,
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Build the registry from the configured LoRA modules and start the
    /// worker pool. The returned state is ready to serve.
    pub fn new(config: Arc<Config>, shutdown: CancellationToken) -> Self {
        let adapters = Arc::new(AdapterRegistry::new(config.lora_names(), config.max_loras));
        let dispatcher = Dispatcher::start(Arc::clone(&config), Arc::clone(&adapters), shutdown);
        Self {
            config,
            adapters,
            dispatcher,
        }
    }
}
