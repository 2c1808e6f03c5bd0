use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::cmp::Reverse;

/// Genres most often glued to titles; used by the delimiter heuristic.
pub const MAJOR_GENRES: [&str; 8] = [
    "Aksiyon",
    "Dram",
    "Komedi",
    "Romantik",
    "Fantastik",
    "Macera",
    "Gizem",
    "Bilim Kurgu",
];

static CAPITALIZED_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)\s*([A-ZÇĞİÖŞÜ][a-zçğıöşü]+,\s*[A-ZÇĞİÖŞÜ][a-zçğıöşü]+)")
        .expect("capitalized pair pattern is valid")
});

static CAPITALIZED_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)\s*[A-ZÇĞİÖŞÜ][a-zçğıöşü]+(?:,\s*[A-ZÇĞİÖŞÜ][a-zçğıöşü]+)*$")
        .expect("capitalized tail pattern is valid")
});

static TOKEN_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,\s]+").expect("separator pattern is valid"));

/// Prefixes this short are too likely to be a cut-off title.
const MIN_TAIL_PREFIX_LEN: usize = 5;

/// One way of removing a genre suffix from a scraped title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStrategy {
    /// Strip a trailing run of known categories, optionally comma separated.
    TrailingCategoryRun,
    /// Cut at the first major genre name.
    LeadingGenreDelimiter,
    /// Cut before the first "Capitalized, Capitalized" pair.
    CapitalizedGenrePair,
    /// Keep words up to the first known genre word.
    GenreTokenScan,
    /// Cut a trailing run of capitalized words when enough title remains.
    CapitalizedTail,
}

impl TitleStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            TitleStrategy::TrailingCategoryRun => "trailing-category-run",
            TitleStrategy::LeadingGenreDelimiter => "leading-genre-delimiter",
            TitleStrategy::CapitalizedGenrePair => "capitalized-genre-pair",
            TitleStrategy::GenreTokenScan => "genre-token-scan",
            TitleStrategy::CapitalizedTail => "capitalized-tail",
        }
    }

    /// Returns the cleaned title, or `None` when this strategy does not apply.
    pub fn apply(&self, raw: &str, categories: &[String]) -> Option<String> {
        let cleaned = match self {
            TitleStrategy::TrailingCategoryRun => trailing_category_run(raw, categories),
            TitleStrategy::LeadingGenreDelimiter => leading_genre_delimiter(raw),
            TitleStrategy::CapitalizedGenrePair => CAPITALIZED_PAIR
                .captures(raw)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
            TitleStrategy::GenreTokenScan => genre_token_scan(raw, categories),
            TitleStrategy::CapitalizedTail => CAPITALIZED_TAIL
                .captures(raw)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim())
                .filter(|prefix| prefix.chars().count() > MIN_TAIL_PREFIX_LEN)
                .map(str::to_string),
        }?;

        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned.to_string())
        }
    }
}

fn trailing_category_run(raw: &str, categories: &[String]) -> Option<String> {
    // Longest first so "Bilim Kurgu" is removed whole rather than as "Kurgu".
    let mut ordered: Vec<&str> = categories
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();
    ordered.sort_by_key(|c| Reverse(c.chars().count()));

    let mut rest = raw.trim_end();
    let mut stripped = false;

    while let Some(prefix) = ordered
        .iter()
        .find_map(|category| strip_suffix_ignore_case(rest, category))
    {
        let prefix = prefix.trim_end();
        let prefix = prefix.strip_suffix(',').map(str::trim_end).unwrap_or(prefix);
        if prefix.is_empty() {
            break;
        }
        rest = prefix;
        stripped = true;
    }

    stripped.then(|| rest.to_string())
}

fn leading_genre_delimiter(raw: &str) -> Option<String> {
    let cut = MAJOR_GENRES
        .iter()
        .filter_map(|genre| raw.find(genre))
        .min()?;
    Some(raw[..cut].to_string())
}

fn genre_token_scan(raw: &str, categories: &[String]) -> Option<String> {
    let genre_words: Vec<&str> = categories
        .iter()
        .filter_map(|c| c.split_whitespace().next())
        .collect();

    let tokens: Vec<&str> = TOKEN_SEPARATOR
        .split(raw.trim())
        .filter(|t| !t.is_empty())
        .collect();
    let stop = tokens.iter().position(|t| genre_words.contains(t))?;
    Some(tokens[..stop].join(" "))
}

/// `text` without `suffix`, comparing characters case-insensitively.
fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let mut text_chars = text.char_indices().rev();
    let mut cut = text.len();
    for expected in suffix.chars().rev() {
        let (idx, actual) = text_chars.next()?;
        if actual != expected && !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        cut = idx;
    }
    Some(&text[..cut])
}
