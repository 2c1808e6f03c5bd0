//! Mock page fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::source::{PageFetcher, PageRequest, RenderedPage, SourceError};

/// Mock implementation of the PageFetcher trait.
///
/// Pages are registered by exact URL. Unregistered URLs answer 404 with an
/// empty body. Every request is recorded for assertions.
///
/// # Example
///
/// ```rust,ignore
/// let fetcher = MockPageFetcher::new();
/// fetcher.set_page("https://www.turkanime.co/", 200, "<html>...</html>").await;
/// fetcher.set_error("https://www.turkanime.co/ajax/turler", SourceError::Timeout("t".into())).await;
///
/// // ... drive a TurkAnimeSource ...
///
/// assert_eq!(fetcher.requested_urls().await.len(), 2);
/// ```
#[derive(Debug)]
pub struct MockPageFetcher {
    /// Responses by URL.
    responses: Arc<RwLock<HashMap<String, Result<RenderedPage, SourceError>>>>,
    /// Recorded fetch calls.
    requests: Arc<RwLock<Vec<PageRequest>>>,
    /// Whether a session is open.
    open: Arc<RwLock<bool>>,
    /// If set, `open` fails with this error.
    open_error: Arc<RwLock<Option<SourceError>>>,
}

impl Default for MockPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPageFetcher {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
            open: Arc::new(RwLock::new(false)),
            open_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Serve `body` with `status` for `url`.
    pub async fn set_page(&self, url: &str, status: u16, body: &str) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), Ok(RenderedPage::new(status, url, body)));
    }

    /// Fail requests for `url` with `error`.
    pub async fn set_error(&self, url: &str, error: SourceError) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), Err(error));
    }

    pub async fn set_open_error(&self, error: Option<SourceError>) {
        *self.open_error.write().await = error;
    }

    pub async fn requests(&self) -> Vec<PageRequest> {
        self.requests.read().await.clone()
    }

    pub async fn requested_urls(&self) -> Vec<String> {
        self.requests
            .read()
            .await
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }

    pub async fn clear_recorded(&self) {
        self.requests.write().await.clear();
    }

    pub async fn is_open(&self) -> bool {
        *self.open.read().await
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn open(&self) -> Result<(), SourceError> {
        if let Some(error) = self.open_error.read().await.clone() {
            return Err(error);
        }
        *self.open.write().await = true;
        Ok(())
    }

    async fn fetch(&self, request: PageRequest) -> Result<RenderedPage, SourceError> {
        let url = request.url.clone();
        self.requests.write().await.push(request);
        *self.open.write().await = true;

        match self.responses.read().await.get(&url) {
            Some(response) => response.clone(),
            None => Ok(RenderedPage::new(404, url, "")),
        }
    }

    async fn close(&self) {
        *self.open.write().await = false;
    }
}
