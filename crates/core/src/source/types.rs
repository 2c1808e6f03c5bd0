use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while talking to the source site.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Session unavailable: {0}")]
    Session(String),

    #[error("Unexpected HTTP status {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Outcome of probing candidate URLs for one episode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProbeResult {
    pub found: bool,
    pub url: Option<String>,
}

impl ProbeResult {
    pub fn found(url: impl Into<String>) -> Self {
        Self {
            found: true,
            url: Some(url.into()),
        }
    }

    pub fn not_found() -> Self {
        Self::default()
    }
}

/// Which part of the show page produced a scan result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMethod {
    /// The "current / total" counter in the info table.
    InfoCounter,
    /// The highest numbered episode link.
    EpisodeLinks,
    #[default]
    None,
}

/// Best guess at a show's latest episode, read from its own page.
///
/// Zero means "no information" for both numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanResult {
    pub latest_episode: u32,
    pub total_episodes: u32,
    pub method: ScanMethod,
}

/// Metadata collected when a show is added.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShowDetails {
    /// 0 when unknown.
    pub total_episodes: u32,
    pub image_url: Option<String>,
}

/// A show listed by the source's search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub slug: String,
}
