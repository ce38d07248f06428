//! Samples, element details and paginated listings.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use super::{ApiError, ApiResult};
use crate::dataset::Dataset;
use crate::state::Session;
use ontoview_core::Error;
use ontoview_store::{Element, Page, PageEntry, Sample, Storage, StorageKind};

pub fn routes() -> Router<Arc<Session>> {
    Router::new()
        .route("/data", get(get_data))
        .route("/details/{element_id}", get(get_details))
        .route("/nodes_paginated", get(nodes_paginated))
        .route("/edges_paginated", get(edges_paginated))
        .route("/hyperedges_paginated", get(hyperedges_paginated))
        .route("/items_paginated", get(items_paginated))
        .route("/visualize", post(visualize))
}

// ---------------------------------------------------------------
// Samples
// ---------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    /// Comma-separated element ids.
    #[serde(default)]
    pub ids: Option<String>,
    #[serde(default)]
    pub hops: Option<usize>,
    #[serde(default)]
    pub highlight: bool,
}

impl DataQuery {
    fn center_ids(&self) -> Vec<String> {
        self.ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    }
}

async fn get_data(State(session): State<Arc<Session>>, Query(query): Query<DataQuery>) -> ApiResult<Sample> {
    let storage = session.storage()?;
    let mut defaults = session.config.defaults.clone();
    if let Some(hops) = query.hops {
        defaults.hops = hops;
    }
    let ids = query.center_ids();
    Ok(Json(storage.get_sample(&ids, &defaults, query.highlight)))
}

async fn get_details(State(session): State<Arc<Session>>, Path(element_id): Path<String>) -> ApiResult<Element> {
    session
        .storage()?
        .get_details(&element_id)
        .map(Json)
        .ok_or_else(|| ApiError(Error::NotFound(format!("element {element_id}"))))
}

// ---------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub page_size: Option<usize>,
}

fn paged(
    session: &Session,
    query: PageQuery,
    list: fn(&Storage, usize, usize) -> ontoview_core::Result<Page<PageEntry>>,
) -> ApiResult<Page<PageEntry>> {
    let storage = session.storage()?;
    let page_size = query.page_size.unwrap_or(session.config.defaults.page_size);
    Ok(Json(list(storage.as_ref(), query.page, page_size)?))
}

async fn nodes_paginated(
    State(session): State<Arc<Session>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<PageEntry>> {
    paged(&session, query, Storage::nodes_page)
}

async fn edges_paginated(
    State(session): State<Arc<Session>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<PageEntry>> {
    paged(&session, query, Storage::edges_page)
}

async fn hyperedges_paginated(
    State(session): State<Arc<Session>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<PageEntry>> {
    paged(&session, query, Storage::hyperedges_page)
}

async fn items_paginated(
    State(session): State<Arc<Session>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<PageEntry>> {
    paged(&session, query, Storage::items_page)
}

// ---------------------------------------------------------------
// Loading
// ---------------------------------------------------------------

/// Replace the session's store with a posted dataset.
async fn visualize(
    State(session): State<Arc<Session>>,
    Json(dataset): Json<Dataset>,
) -> ApiResult<serde_json::Value> {
    let defaults = session.config.defaults.clone();
    let storage = tokio::task::spawn_blocking(move || dataset.build(&defaults))
        .await
        .map_err(|e| ApiError(Error::Callback(e.to_string())))??;
    let kind: StorageKind = storage.kind();
    let stats = storage.get_stats();
    session.replace(storage);
    info!("Visualization replaced via API");
    Ok(Json(serde_json::json!({ "kind": kind, "stats": stats })))
}
