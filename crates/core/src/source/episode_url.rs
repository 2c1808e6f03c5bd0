//! Episode URL construction.

use reqwest::Url;

/// Path segments that precede the show identifier in show URLs.
const SHOW_PATH_MARKERS: [&str; 2] = ["anime", "tanitim"];

/// Extract the show identifier from a show page URL.
///
/// Takes the segment after `/anime/` or `/tanitim/`, or the last non-empty
/// path segment otherwise. Query strings, fragments and trailing slashes
/// are ignored. Returns `None` when the URL has no usable path.
pub fn show_slug(show_url: &str) -> Option<String> {
    let url = Url::parse(show_url.trim()).ok()?;
    let segments: Vec<&str> = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();

    let after_marker = segments
        .iter()
        .position(|segment| SHOW_PATH_MARKERS.contains(segment))
        .and_then(|idx| segments.get(idx + 1));

    after_marker
        .or_else(|| segments.last())
        .map(|segment| segment.to_string())
}

/// Resolve an `href` scraped from the site to an absolute URL.
pub fn resolve_url(base_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    if href.starts_with("//") {
        return Some(format!("https:{}", href));
    }
    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).ok()?;
    base.join(href).ok().map(|url| url.to_string())
}

/// Builds candidate episode page URLs for a show.
#[derive(Debug, Clone)]
pub struct EpisodeUrlBuilder {
    base_url: String,
}

impl EpisodeUrlBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Candidate URLs for `episode`, in the order they should be tried.
    ///
    /// The site sometimes serves the last episode of a finished series under
    /// a `-final` suffix, so when `episode == total_episodes` that variant
    /// comes first.
    pub fn candidates(&self, show_url: &str, episode: u32, total_episodes: u32) -> Vec<String> {
        if episode == 0 {
            return Vec::new();
        }
        let Some(slug) = show_slug(show_url) else {
            return Vec::new();
        };

        let standard = format!("{}/video/{}-{}-bolum", self.base_url, slug, episode);
        if total_episodes > 0 && episode == total_episodes {
            vec![format!("{}-final", standard), standard]
        } else {
            vec![standard]
        }
    }

    /// The preferred URL for `episode`.
    pub fn build(&self, show_url: &str, episode: u32, total_episodes: u32) -> Option<String> {
        self.candidates(show_url, episode, total_episodes)
            .into_iter()
            .next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.turkanime.co";

    #[test]
    fn test_slug_after_marker() {
        assert_eq!(
            show_slug("https://www.turkanime.co/anime/sousou-no-frieren").as_deref(),
            Some("sousou-no-frieren")
        );
        assert_eq!(
            show_slug("https://www.turkanime.co/tanitim/one-piece/").as_deref(),
            Some("one-piece")
        );
        assert_eq!(
            show_slug("https://www.turkanime.co/anime/naruto/bolumler").as_deref(),
            Some("naruto")
        );
    }

    #[test]
    fn test_slug_strips_query_and_trailing_slash() {
        assert_eq!(
            show_slug("https://www.turkanime.co/anime/bleach/?sekme=bolumler").as_deref(),
            Some("bleach")
        );
    }

    #[test]
    fn test_slug_falls_back_to_last_segment() {
        assert_eq!(
            show_slug("https://www.turkanime.co/dizi/monster/").as_deref(),
            Some("monster")
        );
    }

    #[test]
    fn test_slug_malformed() {
        assert_eq!(show_slug("not a url"), None);
        assert_eq!(show_slug("https://www.turkanime.co/"), None);
        assert_eq!(show_slug("https://www.turkanime.co"), None);
    }

    #[test]
    fn test_standard_candidate() {
        let builder = EpisodeUrlBuilder::new(BASE);
        assert_eq!(
            builder.candidates("https://www.turkanime.co/anime/bleach", 5, 366),
            vec!["https://www.turkanime.co/video/bleach-5-bolum".to_string()]
        );
        assert_eq!(
            builder.candidates("https://www.turkanime.co/anime/bleach", 5, 0),
            vec!["https://www.turkanime.co/video/bleach-5-bolum".to_string()]
        );
    }

    #[test]
    fn test_finale_candidate_comes_first() {
        let builder = EpisodeUrlBuilder::new(BASE);
        for total in [1u32, 12, 24, 500] {
            let candidates = builder.candidates("https://www.turkanime.co/anime/x", total, total);
            assert_eq!(candidates.len(), 2);
            assert_eq!(
                candidates[0],
                format!("https://www.turkanime.co/video/x-{}-bolum-final", total)
            );
            assert_eq!(
                candidates[1],
                format!("https://www.turkanime.co/video/x-{}-bolum", total)
            );
        }
    }

    #[test]
    fn test_build_returns_first_candidate() {
        let builder = EpisodeUrlBuilder::new("https://www.turkanime.co/");
        assert_eq!(
            builder
                .build("https://www.turkanime.co/anime/x", 12, 12)
                .as_deref(),
            Some("https://www.turkanime.co/video/x-12-bolum-final")
        );
        assert_eq!(builder.build("garbage", 12, 12), None);
        assert_eq!(builder.build("https://www.turkanime.co/anime/x", 0, 12), None);
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url(BASE, "//www.turkanime.co/anime/x").as_deref(),
            Some("https://www.turkanime.co/anime/x")
        );
        assert_eq!(
            resolve_url(BASE, "/anime/x").as_deref(),
            Some("https://www.turkanime.co/anime/x")
        );
        assert_eq!(
            resolve_url(BASE, "anime/x").as_deref(),
            Some("https://www.turkanime.co/anime/x")
        );
        assert_eq!(
            resolve_url(BASE, "https://cdn.example.com/a.jpg").as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
        assert_eq!(resolve_url(BASE, "#"), None);
        assert_eq!(resolve_url(BASE, ""), None);
    }
}
