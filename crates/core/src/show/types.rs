//! Tracked show types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound accepted for episode counters.
pub const MAX_EPISODE_NUMBER: u32 = 10_000;

/// Watch status of a tracked show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowStatus {
    #[default]
    Watching,
    Completed,
    Planned,
    Paused,
    Dropped,
}

impl ShowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShowStatus::Watching => "watching",
            ShowStatus::Completed => "completed",
            ShowStatus::Planned => "planned",
            ShowStatus::Paused => "paused",
            ShowStatus::Dropped => "dropped",
        }
    }
}

impl fmt::Display for ShowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watching" => Ok(ShowStatus::Watching),
            "completed" => Ok(ShowStatus::Completed),
            "planned" => Ok(ShowStatus::Planned),
            "paused" => Ok(ShowStatus::Paused),
            "dropped" => Ok(ShowStatus::Dropped),
            other => Err(format!("unknown show status: {}", other)),
        }
    }
}

/// A show whose episodes are being followed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedShow {
    /// Opaque identifier, assigned at creation.
    pub id: String,
    /// Display title with category suffixes removed.
    pub title: String,
    /// Canonical show page URL (unique).
    pub source_url: String,
    pub image_url: Option<String>,
    /// Last episode the user has consumed.
    pub current_episode: u32,
    /// Total episodes, 0 when unknown.
    pub total_episodes: u32,
    pub status: ShowStatus,
    /// Set when a new episode was detected and not yet acknowledged.
    pub has_new_episode: bool,
    pub last_checked: Option<DateTime<Utc>>,
    pub date_added: DateTime<Utc>,
    pub notes: Option<String>,
}

impl TrackedShow {
    /// True when the total is known and the user has reached it.
    pub fn is_complete(&self) -> bool {
        self.total_episodes > 0 && self.current_episode >= self.total_episodes
    }

    /// Whether a new-episode flag may be raised for this show.
    pub fn can_have_new_episode(&self) -> bool {
        !self.is_complete()
    }

    /// Status the show should take once progress moves to `episode`.
    ///
    /// Reaching a known total completes the show; moving back below it
    /// reopens a completed show. Other statuses are left alone.
    pub fn status_for_progress(&self, episode: u32) -> ShowStatus {
        if self.total_episodes > 0 && episode >= self.total_episodes {
            ShowStatus::Completed
        } else if self.status == ShowStatus::Completed && episode < self.total_episodes {
            ShowStatus::Watching
        } else {
            self.status
        }
    }
}

/// A recorded watch of a single episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub show_id: String,
    pub episode_number: u32,
    pub watched_at: DateTime<Utc>,
    /// Optional 1..=10 rating.
    pub rating: Option<u8>,
    pub notes: Option<String>,
}
