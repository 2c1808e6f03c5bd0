//! Update check API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use kanshi_core::{BatchOutcome, ReconcileError, UpdateResult};

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CheckShowResponse {
    pub updates: Vec<UpdateResult>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckAllResponse {
    Completed {
        checked: usize,
        skipped: usize,
        failed: usize,
        updates: Vec<UpdateResult>,
    },
    AlreadyRunning,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/shows/{id}/check
pub async fn check_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CheckShowResponse>, ApiError> {
    match state.engine().reconcile_one(&id).await {
        Ok(updates) => {
            state.notifications().notify_updates(&updates).await;
            Ok(Json(CheckShowResponse { updates }))
        }
        Err(e) => Err(reconcile_error(e)),
    }
}

/// POST /api/v1/checks
///
/// Check every show without a pending new episode. Answers 409 while
/// another batch is running.
pub async fn check_all(State(state): State<Arc<AppState>>) -> Response {
    let outcome = kanshi_core::run_check(state.engine(), state.notifications()).await;

    match outcome {
        Ok(BatchOutcome::Completed(report)) => Json(CheckAllResponse::Completed {
            checked: report.checked,
            skipped: report.skipped,
            failed: report.failed,
            updates: report.updates,
        })
        .into_response(),
        Ok(BatchOutcome::AlreadyRunning) => {
            (StatusCode::CONFLICT, Json(CheckAllResponse::AlreadyRunning)).into_response()
        }
        Err(e) => {
            error!("Update check failed: {}", e);
            reconcile_error(e).into_response()
        }
    }
}

fn reconcile_error(e: ReconcileError) -> ApiError {
    let status = match &e {
        ReconcileError::NotFound(_) => StatusCode::NOT_FOUND,
        ReconcileError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ReconcileError::SessionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    api_error(status, e.to_string())
}
