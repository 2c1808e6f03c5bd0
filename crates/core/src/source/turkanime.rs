//! turkanime.co adapter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::episode_url::EpisodeUrlBuilder;
use super::fetcher::{HttpPageFetcher, PageFetcher, PageRequest, RenderedPage};
use super::probe::probe_candidates;
use super::scan::{parse_show_details, scan_show_page};
use super::search::parse_show_list;
use super::token::{extract_categories, extract_token, fallback_categories};
use super::{
    ProbeResult, ScanResult, SearchHit, ShowDetails, SourceAdapter, SourceConfig, SourceError,
};
use crate::title::TitleNormalizer;

const CATEGORIES_PATH: &str = "/ajax/turler";
const SHOW_LIST_PATH: &str = "/ajax/tamliste";
const ACCEPT_LANGUAGE: &str = "tr-TR,tr;q=0.8,en-US;q=0.5,en;q=0.3";

/// Source adapter for turkanime.co.
pub struct TurkAnimeSource {
    config: SourceConfig,
    fetcher: Arc<dyn PageFetcher>,
    urls: EpisodeUrlBuilder,
    token: RwLock<Option<String>>,
    categories: RwLock<Vec<String>>,
}

impl TurkAnimeSource {
    pub fn new(config: SourceConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let urls = EpisodeUrlBuilder::new(config.base());
        Self {
            config,
            fetcher,
            urls,
            token: RwLock::new(None),
            categories: RwLock::new(Vec::new()),
        }
    }

    /// Adapter backed by a real HTTP session.
    pub fn from_config(config: SourceConfig) -> Self {
        let fetcher = Arc::new(HttpPageFetcher::new(
            config.user_agent.clone(),
            config.requests_per_minute,
        ));
        Self::new(config, fetcher)
    }

    fn page_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Accept-Language".to_string(), ACCEPT_LANGUAGE.to_string()),
            ("Referer".to_string(), format!("{}/", self.config.base())),
        ]
    }

    fn ajax_headers(&self, token: String) -> Vec<(String, String)> {
        let mut headers = self.page_headers();
        headers.push(("Accept".to_string(), "*/*".to_string()));
        headers.push(("X-Requested-With".to_string(), "XMLHttpRequest".to_string()));
        headers.push(("token".to_string(), token));
        headers
    }

    async fn fetch_page(&self, url: &str, timeout: Duration) -> Result<RenderedPage, SourceError> {
        let request = PageRequest::new(url, timeout).with_headers(self.page_headers());
        let page = self.fetcher.fetch(request).await?;
        if !page.is_ok() {
            return Err(SourceError::Http {
                status: page.status,
                url: url.to_string(),
            });
        }
        Ok(page)
    }

    async fn fetch_ajax(&self, path: &str) -> Result<RenderedPage, SourceError> {
        let url = format!("{}{}", self.config.base(), path);
        let token = self.get_token().await;
        let request =
            PageRequest::new(&url, self.config.page_timeout()).with_headers(self.ajax_headers(token));
        let page = self.fetcher.fetch(request).await?;
        if !page.is_ok() {
            return Err(SourceError::Http {
                status: page.status,
                url,
            });
        }
        Ok(page)
    }

    async fn known_categories(&self) -> Vec<String> {
        let cached = self.categories.read().await.clone();
        if cached.is_empty() {
            self.fetch_categories().await
        } else {
            cached
        }
    }
}

#[async_trait]
impl SourceAdapter for TurkAnimeSource {
    fn name(&self) -> &str {
        "turkanime"
    }

    fn site_domain(&self) -> String {
        self.config.site_domain()
    }

    async fn open_session(&self) -> Result<(), SourceError> {
        self.fetcher.open().await
    }

    async fn close_session(&self) {
        self.fetcher.close().await;
    }

    async fn get_token(&self) -> String {
        if let Some(token) = self.token.read().await.clone() {
            return token;
        }

        let home = format!("{}/", self.config.base());
        let scraped = match self.fetch_page(&home, self.config.page_timeout()).await {
            Ok(page) => extract_token(&page.body),
            Err(e) => {
                warn!("Failed to load home page for token: {}", e);
                None
            }
        };

        match scraped {
            Some(token) => {
                debug!("Using scraped token");
                *self.token.write().await = Some(token.clone());
                token
            }
            None => {
                debug!("Using fallback token");
                self.config.fallback_token.clone()
            }
        }
    }

    async fn fetch_categories(&self) -> Vec<String> {
        let categories = match self.fetch_ajax(CATEGORIES_PATH).await {
            Ok(page) => extract_categories(&page.body),
            Err(e) => {
                warn!("Failed to fetch categories: {}", e);
                Vec::new()
            }
        };

        let categories = if categories.is_empty() {
            info!("No categories scraped, using built-in list");
            fallback_categories()
        } else {
            info!("Fetched {} categories", categories.len());
            categories
        };

        *self.categories.write().await = categories.clone();
        categories
    }

    async fn probe_episode(
        &self,
        show_url: &str,
        episode: u32,
        total_episodes: u32,
    ) -> Result<ProbeResult, SourceError> {
        let candidates = self.urls.candidates(show_url, episode, total_episodes);
        if candidates.is_empty() {
            debug!("No episode URL can be built from {}", show_url);
            return Ok(ProbeResult::not_found());
        }

        Ok(probe_candidates(
            self.fetcher.as_ref(),
            &candidates,
            &self.page_headers(),
            self.config.probe_timeout(),
        )
        .await)
    }

    async fn scan_latest_episode(&self, show_url: &str) -> Result<ScanResult, SourceError> {
        let page = self.fetch_page(show_url, self.config.scan_timeout()).await?;
        let result = scan_show_page(&page.body, self.config.link_scan_ceiling);
        debug!(
            "Scanned {}: latest {} total {} via {:?}",
            show_url, result.latest_episode, result.total_episodes, result.method
        );
        Ok(result)
    }

    fn episode_url(&self, show_url: &str, episode: u32, total_episodes: u32) -> Option<String> {
        self.urls.build(show_url, episode, total_episodes)
    }

    async fn fetch_show_details(&self, show_url: &str) -> Result<ShowDetails, SourceError> {
        let page = self.fetch_page(show_url, self.config.page_timeout()).await?;
        Ok(parse_show_details(&page.body, self.config.base()))
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SourceError> {
        let normalizer = TitleNormalizer::new(self.known_categories().await);
        let page = self.fetch_ajax(SHOW_LIST_PATH).await?;
        let hits = parse_show_list(&page.body, self.config.base(), query, &normalizer);
        debug!("Search '{}' returned {} hits", query, hits.len());
        Ok(hits)
    }
}
