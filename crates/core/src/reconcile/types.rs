//! Types for update reconciliation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::show::{ShowError, TrackedShow};
use crate::source::SourceError;

/// Errors surfaced by the reconciliation engine.
///
/// Per-show failures never show up here; they are logged and the batch
/// moves on.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("show not found: {0}")]
    NotFound(String),

    #[error("show store error: {0}")]
    Store(#[from] ShowError),

    #[error("source session unavailable: {0}")]
    SessionUnavailable(#[from] SourceError),
}

/// A detected new episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// The show as it was when the episode was detected.
    pub show: TrackedShow,
    pub new_episode: u32,
    /// `None` when the show URL yields no identifier.
    pub episode_url: Option<String>,
}

/// Counts and results of a completed batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Shows that were checked against the source.
    pub checked: usize,
    /// Completed shows that were not checked.
    pub skipped: usize,
    /// Shows whose check failed.
    pub failed: usize,
    pub updates: Vec<UpdateResult>,
}

/// Result of asking the engine for a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Completed(BatchReport),
    /// Another batch was already in flight; nothing was done.
    AlreadyRunning,
}

impl BatchOutcome {
    /// Updates found by the batch, empty when it did not run.
    pub fn updates(&self) -> &[UpdateResult] {
        match self {
            BatchOutcome::Completed(report) => &report.updates,
            BatchOutcome::AlreadyRunning => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReconcileError::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "show not found: abc");

        let err = ReconcileError::from(SourceError::Session("closed".to_string()));
        assert_eq!(
            err.to_string(),
            "source session unavailable: Session unavailable: closed"
        );
    }

    #[test]
    fn test_already_running_has_no_updates() {
        assert!(BatchOutcome::AlreadyRunning.updates().is_empty());
        assert!(BatchOutcome::Completed(BatchReport::default())
            .updates()
            .is_empty());
    }
}
