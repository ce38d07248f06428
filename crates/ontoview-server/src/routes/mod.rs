//! HTTP route handlers for the visualization frontend.

pub mod data;
pub mod meta;
pub mod query;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::state::Session;
use ontoview_core::Error;

/// Build the main Axum router with all routes.
pub fn build_router(session: Arc<Session>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(session)
}

fn api_routes() -> Router<Arc<Session>> {
    Router::new()
        .merge(meta::routes())
        .merge(data::routes())
        .merge(query::routes())
}

/// Error body returned by every handler: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::NotFound(_) | Error::CallbackMissing(_) => StatusCode::NOT_FOUND,
            Error::NoActiveStore
            | Error::Unsupported(_)
            | Error::InvalidRequest(_)
            | Error::Extractor { .. }
            | Error::MissingField(_)
            | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::Callback(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;
