//! Tracked show API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use kanshi_core::{
    CreateShowRequest, EpisodeRecord, ShowDetails, ShowStatus, TitleNormalizer, TrackedShow,
    UpdateResult,
};

use super::handlers::{api_error, show_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for adding a show
#[derive(Debug, Deserialize)]
pub struct CreateShowBody {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub current_episode: u32,
    /// Overrides the total read from the show page
    pub total_episodes: Option<u32>,
    #[serde(default)]
    pub status: ShowStatus,
    pub notes: Option<String>,
}

/// Response for adding a show
#[derive(Debug, Serialize)]
pub struct CreateShowResponse {
    pub show: TrackedShow,
    /// Episodes found by the initial check
    pub updates: Vec<UpdateResult>,
}

#[derive(Debug, Serialize)]
pub struct ListShowsResponse {
    pub shows: Vec<TrackedShow>,
    pub total: usize,
}

/// Request body for setting progress
#[derive(Debug, Deserialize)]
pub struct UpdateEpisodeBody {
    /// Negative values are clamped to 0
    pub episode: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: ShowStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct MarkWatchedBody {
    pub rating: Option<u8>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarkWatchedResponse {
    pub record: EpisodeRecord,
    pub show: TrackedShow,
}

#[derive(Debug, Serialize)]
pub struct EpisodeRecordsResponse {
    pub show_id: String,
    pub episodes: Vec<EpisodeRecord>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/shows
///
/// Shows with a pending new episode come first, then by title.
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListShowsResponse>, ApiError> {
    match state.shows().list() {
        Ok(shows) => {
            let total = shows.len();
            Ok(Json(ListShowsResponse { shows, total }))
        }
        Err(e) => Err(show_error(e)),
    }
}

/// POST /api/v1/shows
///
/// Add a show, then check it right away so episodes past the user's
/// progress are reported immediately.
pub async fn create_show(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateShowBody>,
) -> Result<(StatusCode, Json<CreateShowResponse>), ApiError> {
    let title = clean_title(&state, &body.title);
    let mut request = CreateShowRequest::new(title, body.url.trim());
    request.current_episode = body.current_episode;
    request.status = body.status;
    request.notes = body.notes;
    request.total_episodes = body.total_episodes.unwrap_or(0);

    if let Err(e) = request.validate(&state.source().site_domain()) {
        return Err(show_error(e));
    }
    match state.shows().get_by_url(&request.source_url) {
        Ok(Some(_)) => {
            return Err(api_error(
                StatusCode::CONFLICT,
                format!("Show already tracked: {}", request.source_url),
            ))
        }
        Ok(None) => {}
        Err(e) => return Err(show_error(e)),
    }

    let details = match state.source().fetch_show_details(&request.source_url).await {
        Ok(details) => details,
        Err(e) => {
            warn!("Failed to fetch details for {}: {}", request.source_url, e);
            ShowDetails::default()
        }
    };
    if body.total_episodes.is_none() {
        request.total_episodes = details.total_episodes;
    }
    request.image_url = details.image_url;
    request.last_checked = Some(Utc::now());

    let show = state.shows().create(request).map_err(show_error)?;
    info!("Now tracking {} ({})", show.title, show.id);

    let updates = match state.engine().reconcile_one(&show.id).await {
        Ok(updates) => updates,
        Err(e) => {
            warn!("Initial check failed for {}: {}", show.title, e);
            Vec::new()
        }
    };
    state.notifications().notify_updates(&updates).await;

    let show = match state.shows().get(&show.id) {
        Ok(Some(current)) => current,
        Ok(None) => show,
        Err(e) => return Err(show_error(e)),
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateShowResponse { show, updates }),
    ))
}

/// GET /api/v1/shows/{id}
pub async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TrackedShow>, ApiError> {
    load_show(&state, &id).map(Json)
}

/// DELETE /api/v1/shows/{id}
pub async fn delete_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.shows().delete(&id) {
        Ok(()) => {
            info!("Stopped tracking {}", id);
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => Err(show_error(e)),
    }
}

/// PUT /api/v1/shows/{id}/episode
///
/// Set progress and acknowledge any pending new episode.
pub async fn update_episode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateEpisodeBody>,
) -> Result<Json<TrackedShow>, ApiError> {
    let episode = u32::try_from(body.episode.max(0)).unwrap_or(u32::MAX);

    let result = state
        .shows()
        .set_current_episode(&id, episode)
        .and_then(|_| state.shows().set_has_new_episode(&id, false));

    match result {
        Ok(()) => load_show(&state, &id).map(Json),
        Err(e) => Err(show_error(e)),
    }
}

/// PUT /api/v1/shows/{id}/status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<TrackedShow>, ApiError> {
    state
        .shows()
        .set_status(&id, body.status)
        .map(Json)
        .map_err(show_error)
}

/// DELETE /api/v1/shows/{id}/new-episode
pub async fn clear_new_episode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TrackedShow>, ApiError> {
    match state.shows().set_has_new_episode(&id, false) {
        Ok(()) => load_show(&state, &id).map(Json),
        Err(e) => Err(show_error(e)),
    }
}

/// POST /api/v1/shows/{id}/episodes/{n}/watched
///
/// Record the watch, move progress forward if needed and clear the flag.
pub async fn mark_watched(
    State(state): State<Arc<AppState>>,
    Path((id, episode)): Path<(String, u32)>,
    body: Option<Json<MarkWatchedBody>>,
) -> Result<Json<MarkWatchedResponse>, ApiError> {
    let Json(body) = body.unwrap_or_default();
    let notes = body
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let show = load_show(&state, &id)?;

    let record = state
        .shows()
        .record_episode_watched(&id, episode, body.rating, notes)
        .map_err(show_error)?;

    if episode > show.current_episode {
        state
            .shows()
            .set_current_episode(&id, episode)
            .map_err(show_error)?;
    }
    state
        .shows()
        .set_has_new_episode(&id, false)
        .map_err(show_error)?;

    let show = load_show(&state, &id)?;
    Ok(Json(MarkWatchedResponse { record, show }))
}

/// GET /api/v1/shows/{id}/episodes
pub async fn list_episodes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EpisodeRecordsResponse>, ApiError> {
    load_show(&state, &id)?;
    let episodes = state.shows().episode_records(&id).map_err(show_error)?;
    Ok(Json(EpisodeRecordsResponse {
        show_id: id,
        episodes,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn load_show(state: &AppState, id: &str) -> Result<TrackedShow, ApiError> {
    match state.shows().get(id) {
        Ok(Some(show)) => Ok(show),
        Ok(None) => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Show not found: {}", id),
        )),
        Err(e) => Err(show_error(e)),
    }
}

/// Strip genre suffixes when the site's categories are known.
fn clean_title(state: &AppState, raw: &str) -> String {
    match state.categories().categories() {
        Ok(categories) if !categories.is_empty() => TitleNormalizer::new(categories).normalize(raw),
        Ok(_) => raw.trim().to_string(),
        Err(e) => {
            warn!("Failed to load categories: {}", e);
            raw.trim().to_string()
        }
    }
}
