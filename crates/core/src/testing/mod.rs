//! Testing utilities and mock implementations.
//!
//! This module provides mocks for the traits at the edges of the tracker,
//! so the engine, the source adapter and the HTTP API can be exercised
//! without touching the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use kanshi_core::testing::{MockSource, MockNotifier};
//!
//! let source = MockSource::new();
//! let notifier = MockNotifier::new();
//!
//! // Configure mock responses
//! source.set_probe_hit(show_url, 12, episode_url).await;
//!
//! // Use in a ReconcileEngine / AppState...
//! ```

mod failing_store;
mod mock_notifier;
mod mock_page_fetcher;
mod mock_source;

pub use failing_store::FailingShowStore;
pub use mock_notifier::MockNotifier;
pub use mock_page_fetcher::MockPageFetcher;
pub use mock_source::{MockSource, RecordedProbe};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;

    use crate::show::{ShowStatus, TrackedShow};
    use crate::source::SearchHit;

    /// Show page URL for a slug on the default site.
    pub fn show_url(slug: &str) -> String {
        format!("https://www.turkanime.co/anime/{}", slug)
    }

    /// Episode page URL for a slug on the default site.
    pub fn episode_url(slug: &str, episode: u32) -> String {
        format!("https://www.turkanime.co/video/{}-{}-bolum", slug, episode)
    }

    /// Create a tracked show snapshot with reasonable defaults.
    pub fn tracked_show(title: &str, current_episode: u32, total_episodes: u32) -> TrackedShow {
        let slug = title.to_lowercase().replace(' ', "-");
        TrackedShow {
            id: format!("show-{}", slug),
            title: title.to_string(),
            source_url: show_url(&slug),
            image_url: None,
            current_episode,
            total_episodes,
            status: ShowStatus::Watching,
            has_new_episode: false,
            last_checked: None,
            date_added: Utc::now(),
            notes: None,
        }
    }

    pub fn search_hit(title: &str) -> SearchHit {
        let slug = title.to_lowercase().replace(' ', "-");
        SearchHit {
            title: title.to_string(),
            url: show_url(&slug),
            slug,
        }
    }

    /// Markup of an episode page with a player.
    pub fn episode_page_html() -> String {
        r#"<html><head><title>Bölüm izle</title></head>
<body><div class="video-player"><iframe src="https://player.example/embed/1"></iframe></div></body></html>"#
            .to_string()
    }

    /// Markup of a show page with an info table counter such as `"9 / 28"`.
    pub fn show_page_html(counter: &str) -> String {
        format!(
            r#"<html><body>
<div class="imaj"><img src="//www.turkanime.co/imajlar/anime/kapak.jpg"></div>
<table>
  <tr><td>Kategori</td><td>Aksiyon, Dram</td></tr>
  <tr><td><b>Bölüm Sayısı</b></td><td>:</td><td>{}</td></tr>
</table>
<a href="/video/kapak-1-bolum">1. Bölüm</a>
</body></html>"#,
            counter
        )
    }
}
