//! Direct episode probing.
//!
//! Episode pages are rendered client-side and the site answers 200 for
//! many pages that are not episodes, so the status code alone is not
//! trusted. A 200 is only accepted when the markup shows a player or the
//! page text reads like an episode page.

use std::time::Duration;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::fetcher::{PageFetcher, PageRequest, RenderedPage};
use super::ProbeResult;

static PLAYER_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"video, .video-player, .player, [id*="player"], .video-container, iframe[src*="player"], .episode-content, .video-embed"#,
    )
    .expect("player selector is valid")
});

static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("body selector is valid"));

const EPISODE_TERMS: [&str; 4] = ["bölüm", "episode", "video", "izle"];
const ERROR_TERMS: [&str; 3] = ["bulunamadı", "404", "hata"];

/// Classification of a fetched candidate page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVerdict {
    /// A real episode page.
    Episode,
    /// The site answered 404.
    Missing,
    /// A 200 without episode signals.
    NotEpisode,
    UnexpectedStatus(u16),
}

/// Classify a page returned for a candidate episode URL.
pub fn classify_page(page: &RenderedPage) -> PageVerdict {
    match page.status {
        200 => {
            let document = page.document();
            if has_player(&document) || reads_like_episode(&document) {
                PageVerdict::Episode
            } else {
                PageVerdict::NotEpisode
            }
        }
        404 => PageVerdict::Missing,
        other => PageVerdict::UnexpectedStatus(other),
    }
}

fn has_player(document: &Html) -> bool {
    document.select(&PLAYER_SELECTOR).next().is_some()
}

fn reads_like_episode(document: &Html) -> bool {
    let text = match document.select(&BODY_SELECTOR).next() {
        Some(body) => body.text().collect::<String>(),
        None => document.root_element().text().collect::<String>(),
    }
    .to_lowercase();

    EPISODE_TERMS.iter().any(|term| text.contains(term))
        && !ERROR_TERMS.iter().any(|term| text.contains(term))
}

/// Try each candidate URL in order and return the first real episode page.
///
/// Fetch errors and rejected pages move on to the next candidate.
pub async fn probe_candidates(
    fetcher: &dyn PageFetcher,
    candidates: &[String],
    headers: &[(String, String)],
    timeout: Duration,
) -> ProbeResult {
    for url in candidates {
        let request = PageRequest::new(url.clone(), timeout).with_headers(headers.to_vec());
        let page = match fetcher.fetch(request).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Probe request failed for {}: {}", url, e);
                continue;
            }
        };

        match classify_page(&page) {
            PageVerdict::Episode => {
                debug!("Episode page found at {}", url);
                return ProbeResult::found(url.clone());
            }
            verdict => debug!("Rejected candidate {}: {:?}", url, verdict),
        }
    }

    ProbeResult::not_found()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(status: u16, body: &str) -> RenderedPage {
        RenderedPage::new(status, "https://www.turkanime.co/video/x-1-bolum", body)
    }

    #[test]
    fn test_player_element_is_episode() {
        let html = r#"<html><body><div class="video-player"></div></body></html>"#;
        assert_eq!(classify_page(&page(200, html)), PageVerdict::Episode);

        let iframe = r#"<html><body><iframe src="https://host/player/abc"></iframe></body></html>"#;
        assert_eq!(classify_page(&page(200, iframe)), PageVerdict::Episode);

        let by_id = r#"<html><body><div id="mainplayer"></div></body></html>"#;
        assert_eq!(classify_page(&page(200, by_id)), PageVerdict::Episode);
    }

    #[test]
    fn test_episode_text_is_episode() {
        let html = "<html><body><h1>Frieren 5. Bölüm izle</h1></body></html>";
        assert_eq!(classify_page(&page(200, html)), PageVerdict::Episode);
    }

    #[test]
    fn test_error_text_rejects() {
        let html = "<html><body><h1>Bölüm bulunamadı</h1></body></html>";
        assert_eq!(classify_page(&page(200, html)), PageVerdict::NotEpisode);

        let html = "<html><body>Episode 404</body></html>";
        assert_eq!(classify_page(&page(200, html)), PageVerdict::NotEpisode);
    }

    #[test]
    fn test_plain_page_rejects() {
        let html = "<html><body><h1>Anasayfa</h1></body></html>";
        assert_eq!(classify_page(&page(200, html)), PageVerdict::NotEpisode);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(classify_page(&page(404, "")), PageVerdict::Missing);
        assert_eq!(
            classify_page(&page(503, "<video></video>")),
            PageVerdict::UnexpectedStatus(503)
        );
    }
}
