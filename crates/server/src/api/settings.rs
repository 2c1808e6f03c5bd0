//! Settings API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use kanshi_core::{NotificationPayload, SettingsUpdate, UserSettings};
use serde::{Deserialize, Serialize};

use super::handlers::{api_error, show_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub enabled: bool,
}

/// GET /api/v1/settings/notifications
pub async fn get_notifications(State(state): State<Arc<AppState>>) -> Json<NotificationSettings> {
    Json(NotificationSettings {
        enabled: state.notifications().enabled(),
    })
}

/// PUT /api/v1/settings/notifications
pub async fn set_notifications(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NotificationSettings>,
) -> Result<Json<NotificationSettings>, ApiError> {
    state
        .notifications()
        .set_enabled(body.enabled)
        .map_err(show_error)?;
    Ok(Json(NotificationSettings {
        enabled: state.notifications().enabled(),
    }))
}

/// GET /api/v1/settings
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<UserSettings> {
    Json(state.settings().current())
}

/// PUT /api/v1/settings
///
/// Fields left out of the body keep their value. The check interval is
/// clamped into 1..=1440 minutes.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SettingsUpdate>,
) -> Result<Json<UserSettings>, ApiError> {
    state.settings().update(&body).map(Json).map_err(show_error)
}

/// POST /api/v1/notifications/test
pub async fn send_test_notification(
    State(state): State<Arc<AppState>>,
) -> Result<Json<NotificationPayload>, ApiError> {
    state
        .notifications()
        .send_test()
        .await
        .map(Json)
        .map_err(|e| api_error(StatusCode::BAD_GATEWAY, e.to_string()))
}
