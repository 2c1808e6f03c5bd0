//! Mock source adapter for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::source::{
    fallback_categories, EpisodeUrlBuilder, ProbeResult, ScanMethod, ScanResult, SearchHit,
    ShowDetails, SourceAdapter, SourceError,
};

const MOCK_BASE_URL: &str = "https://www.turkanime.co";

/// A recorded probe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedProbe {
    pub show_url: String,
    pub episode: u32,
    pub total_episodes: u32,
}

#[derive(Debug, Default)]
struct MockSourceState {
    /// Probe hits by (show URL, episode).
    probe_hits: HashMap<(String, u32), String>,
    probe_errors: HashMap<String, SourceError>,
    scans: HashMap<String, Result<ScanResult, SourceError>>,
    details: HashMap<String, ShowDetails>,
    categories: Option<Vec<String>>,
    search_hits: Vec<SearchHit>,
    search_error: Option<SourceError>,
    open_error: Option<SourceError>,
    probe_delay: Option<Duration>,

    probes: Vec<RecordedProbe>,
    scan_calls: Vec<String>,
    open_calls: usize,
    close_calls: usize,
}

/// Mock implementation of the SourceAdapter trait.
///
/// Probes miss and scans report nothing unless configured otherwise.
/// Episode URLs are built the same way as for the real site.
///
/// # Example
///
/// ```rust,ignore
/// let source = MockSource::new();
/// source.set_probe_hit(show_url, 12, "https://www.turkanime.co/video/x-12-bolum").await;
/// source.set_scan_latest(other_url, 7, 0).await;
///
/// // ... run a ReconcileEngine ...
///
/// assert_eq!(source.probe_calls().await.len(), 2);
/// ```
pub struct MockSource {
    state: Arc<RwLock<MockSourceState>>,
    urls: EpisodeUrlBuilder,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSource").finish_non_exhaustive()
    }
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockSourceState::default())),
            urls: EpisodeUrlBuilder::new(MOCK_BASE_URL),
        }
    }

    /// Make the probe for `episode` of `show_url` succeed at `url`.
    pub async fn set_probe_hit(&self, show_url: &str, episode: u32, url: &str) {
        self.state
            .write()
            .await
            .probe_hits
            .insert((show_url.to_string(), episode), url.to_string());
    }

    pub async fn set_probe_error(&self, show_url: &str, error: SourceError) {
        self.state
            .write()
            .await
            .probe_errors
            .insert(show_url.to_string(), error);
    }

    /// Slow every probe down, for exercising the batch guard.
    pub async fn set_probe_delay(&self, delay: Duration) {
        self.state.write().await.probe_delay = Some(delay);
    }

    pub async fn set_scan(&self, show_url: &str, result: ScanResult) {
        self.state
            .write()
            .await
            .scans
            .insert(show_url.to_string(), Ok(result));
    }

    /// Shorthand for an info-counter scan result.
    pub async fn set_scan_latest(&self, show_url: &str, latest: u32, total: u32) {
        self.set_scan(
            show_url,
            ScanResult {
                latest_episode: latest,
                total_episodes: total,
                method: ScanMethod::InfoCounter,
            },
        )
        .await;
    }

    pub async fn set_scan_error(&self, show_url: &str, error: SourceError) {
        self.state
            .write()
            .await
            .scans
            .insert(show_url.to_string(), Err(error));
    }

    pub async fn set_details(&self, show_url: &str, details: ShowDetails) {
        self.state
            .write()
            .await
            .details
            .insert(show_url.to_string(), details);
    }

    pub async fn set_categories(&self, categories: Vec<String>) {
        self.state.write().await.categories = Some(categories);
    }

    pub async fn set_search_hits(&self, hits: Vec<SearchHit>) {
        self.state.write().await.search_hits = hits;
    }

    pub async fn set_search_error(&self, error: Option<SourceError>) {
        self.state.write().await.search_error = error;
    }

    pub async fn set_open_error(&self, error: Option<SourceError>) {
        self.state.write().await.open_error = error;
    }

    pub async fn probe_calls(&self) -> Vec<RecordedProbe> {
        self.state.read().await.probes.clone()
    }

    pub async fn scan_calls(&self) -> Vec<String> {
        self.state.read().await.scan_calls.clone()
    }

    pub async fn open_calls(&self) -> usize {
        self.state.read().await.open_calls
    }

    pub async fn close_calls(&self) -> usize {
        self.state.read().await.close_calls
    }

    pub async fn clear_recorded(&self) {
        let mut state = self.state.write().await;
        state.probes.clear();
        state.scan_calls.clear();
    }
}

#[async_trait]
impl SourceAdapter for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn site_domain(&self) -> String {
        "turkanime.co".to_string()
    }

    async fn open_session(&self) -> Result<(), SourceError> {
        let mut state = self.state.write().await;
        state.open_calls += 1;
        match state.open_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn close_session(&self) {
        self.state.write().await.close_calls += 1;
    }

    async fn get_token(&self) -> String {
        "mock-token".to_string()
    }

    async fn fetch_categories(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .categories
            .clone()
            .unwrap_or_else(fallback_categories)
    }

    async fn probe_episode(
        &self,
        show_url: &str,
        episode: u32,
        total_episodes: u32,
    ) -> Result<ProbeResult, SourceError> {
        let delay = {
            let mut state = self.state.write().await;
            state.probes.push(RecordedProbe {
                show_url: show_url.to_string(),
                episode,
                total_episodes,
            });
            state.probe_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.read().await;
        if let Some(error) = state.probe_errors.get(show_url) {
            return Err(error.clone());
        }
        Ok(state
            .probe_hits
            .get(&(show_url.to_string(), episode))
            .map(ProbeResult::found)
            .unwrap_or_else(ProbeResult::not_found))
    }

    async fn scan_latest_episode(&self, show_url: &str) -> Result<ScanResult, SourceError> {
        let mut state = self.state.write().await;
        state.scan_calls.push(show_url.to_string());
        state
            .scans
            .get(show_url)
            .cloned()
            .unwrap_or_else(|| Ok(ScanResult::default()))
    }

    fn episode_url(&self, show_url: &str, episode: u32, total_episodes: u32) -> Option<String> {
        self.urls.build(show_url, episode, total_episodes)
    }

    async fn fetch_show_details(&self, show_url: &str) -> Result<ShowDetails, SourceError> {
        self.state
            .read()
            .await
            .details
            .get(show_url)
            .cloned()
            .ok_or_else(|| SourceError::Http {
                status: 404,
                url: show_url.to_string(),
            })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SourceError> {
        let state = self.state.read().await;
        if let Some(error) = &state.search_error {
            return Err(error.clone());
        }
        let needle = query.to_lowercase();
        Ok(state
            .search_hits
            .iter()
            .filter(|hit| hit.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
