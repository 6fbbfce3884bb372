//! Model discovery handler.

use crate::models::admin::{ModelInfo, ModelList};
use crate::response::epoch_seconds;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;

/// Handle `GET /v1/models`: the base model plus every resident adapter,
/// adapters pointing at the base model via `parent`.
pub async fn handle_list_models(State(state): State<AppState>) -> Json<ModelList> {
    let created = epoch_seconds();
    let base = state.config.model.clone();

    let mut data = vec![ModelInfo {
        id: base.clone(),
        object: "model".to_string(),
        created,
        owned_by: "vllm".to_string(),
        root: Some(base.clone()),
        parent: None,
    }];
    data.extend(state.adapters.list().into_iter().map(|adapter| ModelInfo {
        id: adapter,
        object: "model".to_string(),
        created,
        owned_by: "vllm".to_string(),
        root: None,
        parent: Some(base.clone()),
    }));

    Json(ModelList {
        object: "list".to_string(),
        data,
    })
}
