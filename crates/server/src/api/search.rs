//! Show search API handler.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use kanshi_core::SearchHit;

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub hits: Vec<SearchHit>,
    pub duration_ms: u64,
}

/// GET /api/v1/search?q=
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.q.trim().to_string();
    let start = Instant::now();
    if query.is_empty() {
        return Ok(Json(SearchResponse {
            query,
            hits: Vec::new(),
            duration_ms: 0,
        }));
    }

    match state.source().search(&query).await {
        Ok(hits) => Ok(Json(SearchResponse {
            query,
            hits,
            duration_ms: start.elapsed().as_millis() as u64,
        })),
        Err(e) => Err(api_error(StatusCode::BAD_GATEWAY, e.to_string())),
    }
}
