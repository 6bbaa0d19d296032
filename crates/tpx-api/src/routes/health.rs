//! Liveness and service info endpoints.

use axum::Json;
use serde_json::{Value, json};

/// GET /health: liveness check.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/: static service banner.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "TorqueProX API v1.0" }))
}
