//! Session token and category extraction.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use scraper::{Html, Selector};

/// Genres used when the category endpoint yields nothing.
pub const FALLBACK_CATEGORIES: [&str; 30] = [
    "Aksiyon",
    "Dram",
    "Komedi",
    "Romantik",
    "Fantastik",
    "Macera",
    "Gizem",
    "Bilim Kurgu",
    "Supernatural",
    "Seinen",
    "Shounen",
    "Shoujo",
    "Josei",
    "Ecchi",
    "Harem",
    "Slice of Life",
    "Okul",
    "Spor",
    "Müzik",
    "Tarih",
    "Askeri",
    "Polis",
    "Gerilim",
    "Korku",
    "Yaoi",
    "Yuri",
    "Mecha",
    "Uzay",
    "Aile",
    "Çocuk",
];

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)token['"]\s*:\s*['"]([a-f0-9]+)['"]"#).expect("token pattern is valid")
});

static CAPITALIZED_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-ZÇĞİÖŞÜ][a-zçğıöşü]+").expect("capitalized word pattern is valid")
});

static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("script selector is valid"));
static TOKEN_META_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[name="csrf-token"], meta[name="token"]"#)
        .expect("meta selector is valid")
});
static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("anchor selector is valid"));

/// Pull the AJAX token out of the home page.
///
/// Inline script assignments win over meta tags.
pub fn extract_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let from_script = document.select(&SCRIPT_SELECTOR).find_map(|script| {
        let source = script.text().collect::<String>();
        TOKEN_PATTERN
            .captures(&source)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    });
    if from_script.is_some() {
        return from_script;
    }

    document
        .select(&TOKEN_META_SELECTOR)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

/// Parse the category endpoint's markup into genre names.
///
/// Anchor texts of plausible length are preferred; otherwise capitalized
/// words from the text are used. May return an empty list.
pub fn extract_categories(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut categories: Vec<String> = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let text = anchor.text().collect::<String>().trim().to_string();
        let len = text.chars().count();
        if len > 1 && len < 20 && !categories.contains(&text) {
            categories.push(text);
        }
    }

    if categories.is_empty() {
        let text = document.root_element().text().collect::<Vec<_>>().join(" ");
        for word in CAPITALIZED_WORD.find_iter(&text) {
            let word = word.as_str().to_string();
            if !categories.contains(&word) {
                categories.push(word);
            }
        }
    }

    categories
}

pub fn fallback_categories() -> Vec<String> {
    FALLBACK_CATEGORIES.iter().map(|c| c.to_string()).collect()
}
