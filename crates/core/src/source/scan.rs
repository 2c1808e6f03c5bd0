//! Show page parsing: latest-episode scanning and show details.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};

use super::episode_url::resolve_url;
use super::{ScanMethod, ScanResult, ShowDetails};

/// Label of the info-table row holding the episode counter, case folded.
const EPISODE_COUNT_LABEL: &str = "bölüm sayisi";

/// Largest total accepted from show details.
const MAX_PLAUSIBLE_TOTAL: u32 = 5000;

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("tr"));
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("td, th"));
static EPISODE_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| selector(r#"a[href*="/video/"][href*="bolum"]"#));
static EPISODE_LIST_SELECTOR: Lazy<Selector> =
    Lazy::new(|| selector(".episode-list .episode, .bolum-listesi .bolum, .episodes .episode"));
static PRIMARY_IMAGE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".imaj img"));
static FALLBACK_IMAGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| selector(".thumbnail img, img.media-object, .poster img"));

static COUNTER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*/\s*(\?|\d+)").expect("counter pattern is valid"));
static EPISODE_HREF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)-bolum").expect("episode href pattern is valid"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// The "current / total" counter from the show info table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeCounter {
    pub current: u32,
    /// `None` when the site shows the `?` placeholder.
    pub total: Option<u32>,
}

/// Find the episode counter in the info table.
///
/// The `?` placeholder is taken as an authoritative "total unknown": the
/// first counter found wins even when its total is `?`.
pub fn info_counter(document: &Html) -> Option<EpisodeCounter> {
    for row in document.select(&ROW_SELECTOR) {
        let cells: Vec<String> = row.select(&CELL_SELECTOR).map(element_text).collect();

        let Some(label_idx) = cells
            .iter()
            .position(|cell| fold_case(cell).contains(EPISODE_COUNT_LABEL))
        else {
            continue;
        };

        // The value may share the label cell ("Bölüm Sayısı: 12 / 24").
        let label_cell = fold_case(&cells[label_idx]);
        let same_cell = label_cell
            .find(EPISODE_COUNT_LABEL)
            .and_then(|pos| label_cell.get(pos + EPISODE_COUNT_LABEL.len()..))
            .map(str::to_string);

        let candidates = same_cell
            .into_iter()
            .chain(cells[label_idx + 1..].iter().cloned());

        for text in candidates {
            if let Some(counter) = parse_counter(&text) {
                return Some(counter);
            }
        }
    }
    None
}

fn parse_counter(text: &str) -> Option<EpisodeCounter> {
    let caps = COUNTER_PATTERN.captures(text)?;
    let current = caps.get(1)?.as_str().parse().ok()?;
    let total = match caps.get(2)?.as_str() {
        "?" => None,
        digits => Some(digits.parse().ok()?),
    };
    Some(EpisodeCounter { current, total })
}

/// Highest episode number linked from the page, ignoring numbers above `ceiling`.
pub fn max_episode_link(document: &Html, ceiling: u32) -> Option<u32> {
    document
        .select(&EPISODE_LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| EPISODE_HREF_PATTERN.captures(href))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .filter(|&n| n > 0 && n <= ceiling)
        .max()
}

/// Infer the latest episode from a show page.
///
/// The info counter is preferred; episode links are a weaker fallback.
pub fn scan_show_page(html: &str, link_ceiling: u32) -> ScanResult {
    let document = Html::parse_document(html);

    if let Some(counter) = info_counter(&document) {
        return ScanResult {
            latest_episode: counter.current,
            total_episodes: counter.total.unwrap_or(0),
            method: ScanMethod::InfoCounter,
        };
    }

    if let Some(latest) = max_episode_link(&document, link_ceiling) {
        return ScanResult {
            latest_episode: latest,
            total_episodes: 0,
            method: ScanMethod::EpisodeLinks,
        };
    }

    ScanResult::default()
}

/// Collect total episode count and cover image from a show page.
pub fn parse_show_details(html: &str, base_url: &str) -> ShowDetails {
    let document = Html::parse_document(html);
    ShowDetails {
        total_episodes: total_episodes(&document),
        image_url: cover_image(&document, base_url),
    }
}

fn total_episodes(document: &Html) -> u32 {
    let plausible = |n: u32| n > 0 && n <= MAX_PLAUSIBLE_TOTAL;

    if let Some(counter) = info_counter(document) {
        // "?" ends the search: the site itself does not know the total.
        return counter.total.filter(|&n| plausible(n)).unwrap_or(0);
    }

    let listed = document.select(&EPISODE_LIST_SELECTOR).count() as u32;
    if plausible(listed) {
        listed
    } else {
        0
    }
}

fn cover_image(document: &Html, base_url: &str) -> Option<String> {
    let image_src = |img: ElementRef| {
        let value = img.value();
        value
            .attr("src")
            .filter(|src| !src.trim().is_empty())
            .or_else(|| value.attr("data-src"))
            .map(str::to_string)
    };

    document
        .select(&PRIMARY_IMAGE_SELECTOR)
        .find_map(image_src)
        .or_else(|| document.select(&FALLBACK_IMAGE_SELECTOR).find_map(image_src))
        .and_then(|src| resolve_url(base_url, &src))
}

/// Lowercase with dotted and dotless i merged, so "SAYISI" matches "sayısı".
fn fold_case(text: &str) -> String {
    text.to_lowercase().replace('ı', "i")
}

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.turkanime.co";

    fn info_table(value: &str) -> String {
        format!(
            r#"<html><body><table>
                <tr><td>Kategori</td><td>Aksiyon, Dram</td></tr>
                <tr><td><b>Bölüm Sayısı</b></td><td>:</td><td>{}</td></tr>
            </table></body></html>"#,
            value
        )
    }

    #[test]
    fn test_scan_info_counter() {
        let result = scan_show_page(&info_table("12 / 24"), 500);
        assert_eq!(
            result,
            ScanResult {
                latest_episode: 12,
                total_episodes: 24,
                method: ScanMethod::InfoCounter,
            }
        );
    }

    #[test]
    fn test_scan_unknown_total_still_reports_current() {
        let result = scan_show_page(&info_table("1071/?"), 500);
        assert_eq!(result.latest_episode, 1071);
        assert_eq!(result.total_episodes, 0);
        assert_eq!(result.method, ScanMethod::InfoCounter);
    }

    #[test]
    fn test_scan_counter_in_label_cell() {
        let html = "<table><tr><td>BÖLÜM SAYISI: 7/13</td></tr></table>";
        let result = scan_show_page(html, 500);
        assert_eq!(result.latest_episode, 7);
        assert_eq!(result.total_episodes, 13);
    }

    #[test]
    fn test_scan_episode_links() {
        let html = r#"<html><body>
            <a href="/video/frieren-1-bolum">1</a>
            <a href="/video/frieren-9-bolum">9</a>
            <a href="/video/frieren-4-bolum">4</a>
            <a href="/video/frieren-2024-bolum">bogus</a>
            <a href="/anime/frieren">show</a>
        </body></html>"#;
        let result = scan_show_page(html, 500);
        assert_eq!(result.latest_episode, 9);
        assert_eq!(result.total_episodes, 0);
        assert_eq!(result.method, ScanMethod::EpisodeLinks);
    }

    #[test]
    fn test_scan_links_with_numeric_slug() {
        let html = r#"<a href="/video/mob-psycho-100-3-bolum">3</a>"#;
        assert_eq!(scan_show_page(html, 500).latest_episode, 3);
    }

    #[test]
    fn test_counter_preferred_over_links() {
        let html = r#"<table><tr><td>Bölüm Sayısı</td><td>5 / 12</td></tr></table>
            <a href="/video/x-11-bolum">11</a>"#;
        let result = scan_show_page(html, 500);
        assert_eq!(result.latest_episode, 5);
        assert_eq!(result.method, ScanMethod::InfoCounter);
    }

    #[test]
    fn test_scan_nothing_found() {
        let result = scan_show_page("<html><body><p>Bakımdayız</p></body></html>", 500);
        assert_eq!(result, ScanResult::default());
    }

    #[test]
    fn test_details_total_and_image() {
        let html = r#"<html><body>
            <div class="imaj"><img data-src="//cdn.turkanime.co/covers/frieren.jpg"></div>
            <table><tr><td>Bölüm Sayısı</td><td>28 / 28</td></tr></table>
        </body></html>"#;
        let details = parse_show_details(html, BASE);
        assert_eq!(details.total_episodes, 28);
        assert_eq!(
            details.image_url.as_deref(),
            Some("https://cdn.turkanime.co/covers/frieren.jpg")
        );
    }

    #[test]
    fn test_details_unknown_total_stops_search() {
        let html = r#"<table><tr><td>Bölüm Sayısı</td><td>3 / ?</td></tr></table>
            <ul class="episode-list"><li class="episode">1</li><li class="episode">2</li></ul>"#;
        assert_eq!(parse_show_details(html, BASE).total_episodes, 0);
    }

    #[test]
    fn test_details_counts_episode_list() {
        let html = r#"<ul class="episode-list">
            <li class="episode">1</li><li class="episode">2</li><li class="episode">3</li>
        </ul><img class="media-object" src="/uploads/cover.png">"#;
        let details = parse_show_details(html, BASE);
        assert_eq!(details.total_episodes, 3);
        assert_eq!(
            details.image_url.as_deref(),
            Some("https://www.turkanime.co/uploads/cover.png")
        );
    }

    #[test]
    fn test_details_reject_implausible_total() {
        let html = "<table><tr><td>Bölüm Sayısı</td><td>1 / 9999</td></tr></table>";
        assert_eq!(parse_show_details(html, BASE).total_episodes, 0);
    }
}
