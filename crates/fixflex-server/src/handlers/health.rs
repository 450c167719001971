//! Health check handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// GET /api/health - Liveness plus a glance at the loaded session
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let session = state.session.read().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "transactions": session.len(),
        "sources": session.sources(),
    }))
}
