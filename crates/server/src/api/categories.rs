//! Category API handlers.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use super::handlers::{show_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
    pub total: usize,
}

impl From<Vec<String>> for CategoriesResponse {
    fn from(categories: Vec<String>) -> Self {
        Self {
            total: categories.len(),
            categories,
        }
    }
}

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    state
        .categories()
        .categories()
        .map(|c| Json(CategoriesResponse::from(c)))
        .map_err(show_error)
}

/// POST /api/v1/categories/refresh
///
/// Re-scrape the genre list and replace the stored one.
pub async fn refresh_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = state.source().fetch_categories().await;
    state
        .categories()
        .replace_categories(&categories)
        .map_err(show_error)?;
    info!("Stored {} categories", categories.len());

    list_categories(State(state)).await
}
