//! LoRA adapter residency tracking.
//!
//! The registry distinguishes statically-declared adapters (from
//! `--lora-modules`, always servable, never evicted) from dynamically-loaded
//! ones, which compete for `max_loras` slots under least-recently-used
//! eviction. All transitions happen under one mutex; hold time is O(loaded).

use std::collections::HashMap;
use std::sync::Mutex;

/// Errors from the admin load/unload operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("LoRA adapter '{0}' is not loaded")]
    Unknown(String),
    #[error("LoRA adapter '{0}' is statically configured and cannot be unloaded")]
    Static(String),
}

/// Tracks which LoRA adapters are resident and in what order they were used.
pub struct AdapterRegistry {
    max_loras: usize,
    state: Mutex<RegistryState>,
}

struct RegistryState {
    /// Startup adapters in declaration order. Not counted against capacity.
    static_names: Vec<String>,
    /// Dynamically-loaded adapters, `name -> last_used_tick`.
    dynamic: HashMap<String, u64>,
    /// Monotonic use counter backing the LRU order.
    tick: u64,
}

impl AdapterRegistry {
    pub fn new(static_names: Vec<String>, max_loras: usize) -> Self {
        Self {
            max_loras,
            state: Mutex::new(RegistryState {
                static_names,
                dynamic: HashMap::new(),
                tick: 0,
            }),
        }
    }

    /// Record a use of `name`, loading it if necessary.
    ///
    /// Static adapters are always admitted as-is. A dynamically-loaded
    /// adapter gets its recency refreshed; an unseen name is inserted,
    /// evicting the least-recently-used dynamic adapter when the set is at
    /// capacity. Admission never blocks on anything but the registry lock.
    pub fn admit(&self, name: &str) {
        let mut state = self.state.lock().expect("adapter registry lock poisoned");
        state.tick += 1;
        let tick = state.tick;

        if state.static_names.iter().any(|n| n == name) {
            return;
        }
        if let Some(last_used) = state.dynamic.get_mut(name) {
            *last_used = tick;
            return;
        }
        if state.dynamic.len() >= self.max_loras {
            if let Some(lru) = state
                .dynamic
                .iter()
                .min_by_key(|(_, &t)| t)
                .map(|(n, _)| n.clone())
            {
                state.dynamic.remove(&lru);
            }
        }
        state.dynamic.insert(name.to_string(), tick);
    }

    /// Admin load. Same admission rules as [`AdapterRegistry::admit`].
    pub fn load(&self, name: &str) {
        self.admit(name);
    }

    /// Admin unload. Refuses static adapters and unknown names.
    pub fn unload(&self, name: &str) -> Result<(), AdapterError> {
        let mut state = self.state.lock().expect("adapter registry lock poisoned");
        if state.static_names.iter().any(|n| n == name) {
            return Err(AdapterError::Static(name.to_string()));
        }
        if state.dynamic.remove(name).is_none() {
            return Err(AdapterError::Unknown(name.to_string()));
        }
        Ok(())
    }

    /// Whether `name` is currently servable (static or loaded).
    pub fn contains(&self, name: &str) -> bool {
        let state = self.state.lock().expect("adapter registry lock poisoned");
        state.static_names.iter().any(|n| n == name) || state.dynamic.contains_key(name)
    }

    /// Snapshot for `/v1/models`: static adapters in declaration order,
    /// then dynamic adapters in least-recently-used-first order.
    pub fn list(&self) -> Vec<String> {
        let state = self.state.lock().expect("adapter registry lock poisoned");
        let mut dynamic: Vec<(&String, &u64)> = state.dynamic.iter().collect();
        dynamic.sort_by_key(|(_, &tick)| tick);
        state
            .static_names
            .iter()
            .cloned()
            .chain(dynamic.into_iter().map(|(name, _)| name.clone()))
            .collect()
    }

    /// Number of dynamically-loaded adapters.
    pub fn loaded_count(&self) -> usize {
        let state = self.state.lock().expect("adapter registry lock poisoned");
        state.dynamic.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(max_loras: usize) -> AdapterRegistry {
        AdapterRegistry::new(vec!["food-review-1".to_string()], max_loras)
    }

    #[test]
    fn static_adapters_are_always_present() {
        let reg = registry(1);
        assert!(reg.contains("food-review-1"));
        assert_eq!(reg.list(), vec!["food-review-1"]);
        assert_eq!(reg.loaded_count(), 0);
    }

    #[test]
    fn admitting_a_static_adapter_does_not_use_capacity() {
        let reg = registry(1);
        reg.admit("food-review-1");
        assert_eq!(reg.loaded_count(), 0);
    }

    #[test]
    fn lru_eviction_at_capacity() {
        let reg = registry(2);
        reg.load("x");
        reg.load("y");
        reg.load("z");
        assert!(!reg.contains("x"), "least-recently-used adapter should go");
        assert!(reg.contains("y"));
        assert!(reg.contains("z"));
        assert!(reg.contains("food-review-1"));
        assert_eq!(reg.list(), vec!["food-review-1", "y", "z"]);
    }

    #[test]
    fn admitting_refreshes_recency() {
        let reg = registry(2);
        reg.load("x");
        reg.load("y");
        reg.admit("x");
        reg.load("z");
        assert!(reg.contains("x"), "recently-used adapter must survive");
        assert!(!reg.contains("y"));
        assert!(reg.contains("z"));
    }

    #[test]
    fn reloading_a_loaded_adapter_is_a_touch() {
        let reg = registry(2);
        reg.load("x");
        reg.load("x");
        assert_eq!(reg.loaded_count(), 1);
    }

    #[test]
    fn unload_static_is_refused() {
        let reg = registry(2);
        assert_eq!(
            reg.unload("food-review-1"),
            Err(AdapterError::Static("food-review-1".to_string()))
        );
        assert!(reg.contains("food-review-1"));
    }

    #[test]
    fn unload_unknown_is_an_error() {
        let reg = registry(2);
        assert_eq!(
            reg.unload("never-loaded"),
            Err(AdapterError::Unknown("never-loaded".to_string()))
        );
    }

    #[test]
    fn unload_removes_a_dynamic_adapter() {
        let reg = registry(2);
        reg.load("x");
        assert!(reg.unload("x").is_ok());
        assert!(!reg.contains("x"));
        assert_eq!(reg.loaded_count(), 0);
    }

    #[test]
    fn unknown_model_is_not_contained() {
        assert!(!registry(2).contains("other_model"));
    }
}
