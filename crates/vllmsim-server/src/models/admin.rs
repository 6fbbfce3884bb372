//! Admin and discovery types: LoRA load/unload bodies and the model list.

use serde::{Deserialize, Serialize};

/// `POST /v1/load_lora_adapter` body.
#[derive(Debug, Deserialize)]
pub struct LoadLoraRequest {
    pub lora_name: String,
    #[serde(default)]
    pub lora_path: Option<String>,
}

/// `POST /v1/unload_lora_adapter` body.
#[derive(Debug, Deserialize)]
pub struct UnloadLoraRequest {
    pub lora_name: String,
}

/// `GET /v1/models` response.
#[derive(Debug, Serialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<ModelInfo>,
}

/// One servable model: the base model or a resident LoRA adapter.
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub owned_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    /// Base model name for adapters; absent on the base model itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}
