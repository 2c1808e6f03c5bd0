//! Title normalization.
//!
//! Titles scraped from the show list arrive with their genres glued to the
//! end ("Vinland SagaAksiyon, Dram, Macera"). [`TitleNormalizer`] removes
//! that suffix by trying an ordered list of [`TitleStrategy`] values; the
//! first strategy that matches wins.

mod strategy;

pub use strategy::{TitleStrategy, MAJOR_GENRES};

use crate::source::fallback_categories;

/// Strips trailing genre lists from scraped titles.
#[derive(Debug, Clone)]
pub struct TitleNormalizer {
    categories: Vec<String>,
    strategies: Vec<TitleStrategy>,
}

impl TitleNormalizer {
    /// Build a normalizer for the given scraped category list.
    ///
    /// With categories the exact trailing-run strategy is used; without them
    /// the heuristic strategies run against the built-in genre list.
    pub fn new(categories: Vec<String>) -> Self {
        let categories: Vec<String> = categories
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        if categories.is_empty() {
            Self::heuristic()
        } else {
            Self {
                categories,
                strategies: vec![TitleStrategy::TrailingCategoryRun],
            }
        }
    }

    /// Normalizer that relies only on the built-in heuristics.
    pub fn heuristic() -> Self {
        Self {
            categories: fallback_categories(),
            strategies: vec![
                TitleStrategy::LeadingGenreDelimiter,
                TitleStrategy::CapitalizedGenrePair,
                TitleStrategy::GenreTokenScan,
                TitleStrategy::CapitalizedTail,
            ],
        }
    }

    pub fn strategies(&self) -> &[TitleStrategy] {
        &self.strategies
    }

    /// Clean a raw title. Returns the trimmed input when no strategy matches.
    pub fn normalize(&self, raw: &str) -> String {
        self.normalize_traced(raw).0
    }

    /// Like [`normalize`](Self::normalize), also reporting which strategy matched.
    pub fn normalize_traced(&self, raw: &str) -> (String, Option<TitleStrategy>) {
        for strategy in &self.strategies {
            if let Some(clean) = strategy.apply(raw, &self.categories) {
                return (clean, Some(*strategy));
            }
        }
        (raw.trim().to_string(), None)
    }
}

impl Default for TitleNormalizer {
    fn default() -> Self {
        Self::heuristic()
    }
}
