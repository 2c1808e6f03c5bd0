//! Page fetching.
//!
//! [`PageFetcher`] is the only component that performs network I/O. It
//! returns the status and raw markup of a page; callers run read-only DOM
//! queries on [`RenderedPage::document`].

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use scraper::Html;
use tracing::debug;

use super::rate_limiter::RateLimiter;
use super::SourceError;

/// A single page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl PageRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            timeout,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A loaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub status: u16,
    /// URL after redirects.
    pub url: String,
    pub body: String,
}

impl RenderedPage {
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Parse the body for DOM queries.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Fetches pages with custom headers and per-request timeouts.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Make sure the underlying session exists.
    async fn open(&self) -> Result<(), SourceError>;

    async fn fetch(&self, request: PageRequest) -> Result<RenderedPage, SourceError>;

    /// Dispose of the session. A later fetch opens a new one.
    async fn close(&self);
}

/// reqwest-backed fetcher with a lazily created, reusable client.
pub struct HttpPageFetcher {
    user_agent: String,
    client: Mutex<Option<Client>>,
    limiter: Option<RateLimiter>,
}

impl HttpPageFetcher {
    pub fn new(user_agent: impl Into<String>, requests_per_minute: u32) -> Self {
        Self {
            user_agent: user_agent.into(),
            client: Mutex::new(None),
            limiter: RateLimiter::new(requests_per_minute),
        }
    }

    fn session(&self) -> Result<Client, SourceError> {
        let mut guard = self
            .client
            .lock()
            .map_err(|_| SourceError::Session("client mutex poisoned".to_string()))?;

        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let client = Client::builder()
            .user_agent(&self.user_agent)
            .cookie_store(true)
            .build()
            .map_err(|e| SourceError::Session(e.to_string()))?;
        debug!("Opened HTTP session");
        *guard = Some(client.clone());
        Ok(client)
    }

    fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, SourceError> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SourceError::InvalidRequest(format!("header {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| SourceError::InvalidRequest(format!("header value: {}", e)))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

fn map_request_error(url: &str, e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout(url.to_string())
    } else if e.is_connect() {
        SourceError::ConnectionFailed(format!("{}: {}", url, e))
    } else if e.is_builder() {
        SourceError::InvalidRequest(format!("{}: {}", url, e))
    } else {
        SourceError::ConnectionFailed(format!("{}: {}", url, e))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn open(&self) -> Result<(), SourceError> {
        self.session().map(|_| ())
    }

    async fn fetch(&self, request: PageRequest) -> Result<RenderedPage, SourceError> {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }

        let client = self.session()?;
        let headers = Self::header_map(&request.headers)?;

        debug!(url = %request.url, timeout = ?request.timeout, "Fetching page");
        let response = client
            .get(&request.url)
            .headers(headers)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| map_request_error(&request.url, e))?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| map_request_error(&request.url, e))?;

        Ok(RenderedPage { status, url, body })
    }

    async fn close(&self) {
        if let Ok(mut guard) = self.client.lock() {
            if guard.take().is_some() {
                debug!("Closed HTTP session");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_header_lookup_is_case_insensitive() {
        let request = PageRequest::new("https://example.com", Duration::from_secs(1))
            .with_header("X-Requested-With", "XMLHttpRequest");
        assert_eq!(request.header("x-requested-with"), Some("XMLHttpRequest"));
        assert_eq!(request.header("token"), None);
    }

    #[test]
    fn test_header_map_rejects_invalid_names() {
        let headers = vec![("bad header".to_string(), "v".to_string())];
        assert!(matches!(
            HttpPageFetcher::header_map(&headers),
            Err(SourceError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_session_is_reused_until_closed() {
        let fetcher = HttpPageFetcher::new("kanshi-test", 0);
        fetcher.open().await.unwrap();
        assert!(fetcher.client.lock().unwrap().is_some());

        fetcher.close().await;
        assert!(fetcher.client.lock().unwrap().is_none());

        fetcher.open().await.unwrap();
        assert!(fetcher.client.lock().unwrap().is_some());
    }

    #[test]
    fn test_rendered_page_document() {
        let page = RenderedPage::new(200, "https://example.com", "<p class='x'>hi</p>");
        assert!(page.is_ok());
        let doc = page.document();
        let selector = scraper::Selector::parse("p.x").unwrap();
        assert_eq!(doc.select(&selector).count(), 1);
    }
}
