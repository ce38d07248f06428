//! Free-text search and chat, both delegated to registered handlers.
//!
//! Handlers are synchronous and may be slow (an LLM call, an index
//! lookup), so they run on the blocking pool.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, ApiResult};
use crate::state::Session;
use ontoview_core::Error;
use ontoview_store::Sample;

pub fn routes() -> Router<Arc<Session>> {
    Router::new()
        .route("/search", post(search))
        .route("/chat", post(chat))
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    /// Merged into the session context before the handler runs.
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

impl QueryRequest {
    fn text(&self) -> Result<String, ApiError> {
        let text = self.query.trim();
        if text.is_empty() {
            return Err(ApiError(Error::InvalidRequest("query must not be empty".into())));
        }
        Ok(text.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub data: Sample,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Sample>,
}

async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError(Error::Callback(e.to_string())))?
        .map_err(|e| ApiError(Error::Callback(format!("{e:#}"))))
}

async fn search(State(session): State<Arc<Session>>, Json(req): Json<QueryRequest>) -> ApiResult<SearchResponse> {
    let query = req.text()?;
    let storage = session.storage()?;
    let handler = session.search_handler()?;
    if let Some(context) = req.context {
        session.set_context(context);
    }
    let context = session.context();

    let matches = {
        let storage = storage.clone();
        let query = query.clone();
        run_blocking(move || handler.search(&storage, &query, &context)).await?
    };

    let data = storage.get_sample_from_data(&matches, &session.config.defaults, true)?;
    info!("Search {:?} matched {} elements", query, data.len());
    Ok(Json(SearchResponse { query, data }))
}

async fn chat(State(session): State<Arc<Session>>, Json(req): Json<QueryRequest>) -> ApiResult<ChatResponse> {
    let query = req.text()?;
    let storage = session.storage()?;
    let handler = session.chat_handler()?;
    if let Some(context) = req.context {
        session.set_context(context);
    }
    let context = session.context();

    let reply = {
        let storage = storage.clone();
        run_blocking(move || handler.chat(&storage, &query, &context)).await?
    };

    let data = reply
        .matches
        .filter(|m| !m.is_empty())
        .map(|m| storage.get_sample_from_data(&m, &session.config.defaults, true))
        .transpose()?;
    Ok(Json(ChatResponse {
        response: reply.response,
        data,
    }))
}
