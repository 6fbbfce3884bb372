//! LoRA adapter admin handlers.

use crate::error::ServerError;
use crate::models::admin::{LoadLoraRequest, UnloadLoraRequest};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

/// Handle `POST /v1/load_lora_adapter`. Loading past `max-loras` evicts the
/// least-recently-used dynamically-loaded adapter.
pub async fn handle_load_lora(
    State(state): State<AppState>,
    Json(request): Json<LoadLoraRequest>,
) -> StatusCode {
    state.adapters.load(&request.lora_name);
    tracing::info!(
        adapter = %request.lora_name,
        path = request.lora_path.as_deref().unwrap_or(""),
        "loaded LoRA adapter"
    );
    StatusCode::OK
}

/// Handle `POST /v1/unload_lora_adapter`. Static adapters are refused.
pub async fn handle_unload_lora(
    State(state): State<AppState>,
    Json(request): Json<UnloadLoraRequest>,
) -> Result<StatusCode, ServerError> {
    state.adapters.unload(&request.lora_name)?;
    tracing::info!(adapter = %request.lora_name, "unloaded LoRA adapter");
    Ok(StatusCode::OK)
}
