//! Source site access.
//!
//! A [`SourceAdapter`] bundles everything the tracker needs from one site:
//! probing episode URLs, scanning show pages, the session token, categories,
//! show details and search. [`TurkAnimeSource`] is the only adapter; other
//! sites would be added as further implementations of the trait.

mod config;
mod episode_url;
mod fetcher;
mod probe;
mod rate_limiter;
mod scan;
mod search;
mod token;
mod turkanime;
mod types;

pub use config::SourceConfig;
pub use episode_url::{resolve_url, show_slug, EpisodeUrlBuilder};
pub use fetcher::{HttpPageFetcher, PageFetcher, PageRequest, RenderedPage};
pub use probe::{classify_page, probe_candidates, PageVerdict};
pub use rate_limiter::{RateLimiter, TokenBucket};
pub use scan::{info_counter, max_episode_link, parse_show_details, scan_show_page, EpisodeCounter};
pub use search::{parse_show_list, MAX_SEARCH_RESULTS};
pub use token::{extract_categories, extract_token, fallback_categories, FALLBACK_CATEGORIES};
pub use turkanime::TurkAnimeSource;
pub use types::{ProbeResult, ScanMethod, ScanResult, SearchHit, ShowDetails, SourceError};

use async_trait::async_trait;

/// Everything the tracker needs from one source site.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Name of this source (for logging).
    fn name(&self) -> &str;

    /// Host that tracked show URLs must belong to.
    fn site_domain(&self) -> String;

    /// Open the shared session ahead of a batch.
    async fn open_session(&self) -> Result<(), SourceError>;

    /// Dispose of the shared session.
    async fn close_session(&self);

    /// Token sent with AJAX requests. Falls back to a built-in value.
    async fn get_token(&self) -> String;

    /// Genre list. Falls back to a built-in list.
    async fn fetch_categories(&self) -> Vec<String>;

    /// Check whether `episode` of the show exists.
    async fn probe_episode(
        &self,
        show_url: &str,
        episode: u32,
        total_episodes: u32,
    ) -> Result<ProbeResult, SourceError>;

    /// Read the latest episode number from the show's own page.
    async fn scan_latest_episode(&self, show_url: &str) -> Result<ScanResult, SourceError>;

    /// Preferred URL of `episode`, or `None` when the show URL has no identifier.
    fn episode_url(&self, show_url: &str, episode: u32, total_episodes: u32) -> Option<String>;

    async fn fetch_show_details(&self, show_url: &str) -> Result<ShowDetails, SourceError>;

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SourceError>;
}
