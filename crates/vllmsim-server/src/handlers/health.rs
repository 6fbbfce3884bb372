//! Health and readiness handlers. Both report 200 unconditionally once the
//! worker pool is up, which is as soon as the router exists.

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// Handle `GET /health`.
pub async fn handle_health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Handle `GET /ready`.
pub async fn handle_ready() -> StatusCode {
    StatusCode::OK
}
