//! Health and session metadata.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use super::ApiResult;
use crate::state::Session;
use ontoview_store::Stats;

pub fn routes() -> Router<Arc<Session>> {
    Router::new()
        .route("/health", get(health))
        .route("/meta", get(meta))
        .route("/stats", get(stats))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// What the frontend needs before its first request: which store is
/// loaded, which handlers exist, and the sampling defaults.
async fn meta(State(session): State<Arc<Session>>) -> Json<serde_json::Value> {
    let kind = session.storage().ok().map(|s| s.kind());
    let defaults = &session.config.defaults;
    Json(serde_json::json!({
        "kind": kind,
        "features": session.features(),
        "hops": defaults.hops,
        "pageSize": defaults.page_size,
        "context": session.context(),
    }))
}

async fn stats(State(session): State<Arc<Session>>) -> ApiResult<Stats> {
    Ok(Json(session.storage()?.get_stats()))
}
