//! Show storage traits and request types.

use chrono::{DateTime, Utc};
use reqwest::Url;
use thiserror::Error;

use super::{EpisodeRecord, ShowStatus, TrackedShow, MAX_EPISODE_NUMBER};

/// Error type for show storage operations.
#[derive(Debug, Error)]
pub enum ShowError {
    #[error("Show not found: {0}")]
    NotFound(String),

    #[error("Show already tracked: {0}")]
    Duplicate(String),

    #[error("Invalid show data: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Request to start tracking a show.
#[derive(Debug, Clone)]
pub struct CreateShowRequest {
    pub title: String,
    pub source_url: String,
    pub image_url: Option<String>,
    pub current_episode: u32,
    /// 0 when unknown.
    pub total_episodes: u32,
    pub status: ShowStatus,
    pub notes: Option<String>,
    /// Initial last-checked timestamp.
    pub last_checked: Option<DateTime<Utc>>,
}

impl CreateShowRequest {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
            image_url: None,
            current_episode: 0,
            total_episodes: 0,
            status: ShowStatus::Watching,
            notes: None,
            last_checked: None,
        }
    }

    pub fn with_progress(mut self, current_episode: u32, total_episodes: u32) -> Self {
        self.current_episode = current_episode;
        self.total_episodes = total_episodes;
        self
    }

    /// Check the request against the host the source serves.
    pub fn validate(&self, required_host: &str) -> Result<(), ShowError> {
        if self.title.trim().is_empty() {
            return Err(ShowError::Validation("title cannot be empty".to_string()));
        }
        if !is_on_host(&self.source_url, required_host) {
            return Err(ShowError::Validation(format!(
                "url must point at {}: {}",
                required_host, self.source_url
            )));
        }
        validate_episode_number("current_episode", self.current_episode)?;
        validate_episode_number("total_episodes", self.total_episodes)?;
        Ok(())
    }
}

/// True when `url` is an http(s) URL served by `host` or one of its subdomains.
fn is_on_host(url: &str, host: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    let Some(actual) = parsed.host_str() else {
        return false;
    };
    let actual = actual.trim_end_matches('.').to_ascii_lowercase();
    let host = host.trim_start_matches("www.").to_ascii_lowercase();
    actual == host || actual.ends_with(&format!(".{}", host))
}

pub(crate) fn validate_episode_number(field: &str, value: u32) -> Result<(), ShowError> {
    if value > MAX_EPISODE_NUMBER {
        return Err(ShowError::Validation(format!(
            "{} must be between 0 and {}, got {}",
            field, MAX_EPISODE_NUMBER, value
        )));
    }
    Ok(())
}

/// Storage for tracked shows and their watch records.
pub trait ShowStore: Send + Sync {
    /// Create a new tracked show.
    fn create(&self, request: CreateShowRequest) -> Result<TrackedShow, ShowError>;

    fn get(&self, id: &str) -> Result<Option<TrackedShow>, ShowError>;

    fn get_by_url(&self, source_url: &str) -> Result<Option<TrackedShow>, ShowError>;

    /// All shows, flagged ones first, then by title.
    fn list(&self) -> Result<Vec<TrackedShow>, ShowError>;

    /// Shows without a pending new-episode flag, alphabetical by title.
    fn find_pending_check(&self) -> Result<Vec<TrackedShow>, ShowError>;

    /// Raise or clear the new-episode flag.
    ///
    /// Raising the flag on a completed show is a no-op.
    fn set_has_new_episode(&self, id: &str, has_new_episode: bool) -> Result<(), ShowError>;

    fn set_last_checked(&self, id: &str, checked_at: DateTime<Utc>) -> Result<(), ShowError>;

    /// Move progress to `episode`, applying status auto-transitions.
    ///
    /// Does not touch the new-episode flag; callers clear it explicitly.
    fn set_current_episode(&self, id: &str, episode: u32) -> Result<TrackedShow, ShowError>;

    fn set_status(&self, id: &str, status: ShowStatus) -> Result<TrackedShow, ShowError>;

    /// Delete a show and its watch records.
    fn delete(&self, id: &str) -> Result<(), ShowError>;

    /// Record (or re-record) an episode as watched. Re-recording replaces
    /// the rating and notes.
    fn record_episode_watched(
        &self,
        id: &str,
        episode: u32,
        rating: Option<u8>,
        notes: Option<String>,
    ) -> Result<EpisodeRecord, ShowError>;

    fn episode_records(&self, id: &str) -> Result<Vec<EpisodeRecord>, ShowError>;
}

/// Storage for the scraped category list.
pub trait CategoryStore: Send + Sync {
    fn categories(&self) -> Result<Vec<String>, ShowError>;

    /// Replace the stored list with `categories`.
    fn replace_categories(&self, categories: &[String]) -> Result<(), ShowError>;
}

/// Key/value user settings.
pub trait SettingsStore: Send + Sync {
    fn get_setting(&self, key: &str) -> Result<Option<String>, ShowError>;

    fn set_setting(&self, key: &str, value: &str) -> Result<(), ShowError>;
}
