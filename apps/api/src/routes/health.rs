use axum::Json;
use serde_json::{json, Value};

use crate::llm_client::MODEL;

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Recruit API is running!",
        "model": MODEL,
        "type": "huggingface_api"
    }))
}

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "recruit-api"
    }))
}
