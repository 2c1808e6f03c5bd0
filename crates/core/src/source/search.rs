//! Search over the site's full show list.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::episode_url::{resolve_url, show_slug};
use super::SearchHit;
use crate::title::TitleNormalizer;

/// Maximum number of hits returned for one query.
pub const MAX_SEARCH_RESULTS: usize = 20;

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// Find shows in the show list markup whose title contains `query`.
pub fn parse_show_list(
    html: &str,
    base_url: &str,
    query: &str,
    normalizer: &TitleNormalizer,
) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    let mut hits: Vec<SearchHit> = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let raw_title = anchor.text().collect::<String>();
        if !raw_title.to_lowercase().contains(&needle) {
            continue;
        }

        let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(|href| resolve_url(base_url, href))
        else {
            continue;
        };
        if hits.iter().any(|hit| hit.url == url) {
            continue;
        }
        let Some(slug) = show_slug(&url) else {
            continue;
        };

        hits.push(SearchHit {
            title: normalizer.normalize(&raw_title),
            url,
            slug,
        });
        if hits.len() >= MAX_SEARCH_RESULTS {
            break;
        }
    }

    hits
}
