//! Deterministic intent classification over the keyword catalog.

use falcon_core::types::Category;

use crate::catalog::KeywordCatalog;

/// Trim, lower-case and collapse internal whitespace.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rule-based classifier for bilingual health utterances.
///
/// Scans the catalog in priority order and returns the first category with a
/// matching keyword, so an emergency keyword always wins over anything else
/// in the same utterance.
pub struct IntentClassifier {
    utterances: &'static KeywordCatalog,
    markers: &'static KeywordCatalog,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self {
            utterances: KeywordCatalog::utterances(),
            markers: KeywordCatalog::response_markers(),
        }
    }

    /// Classify a raw user utterance. Falls back to `General`.
    pub fn classify(&self, utterance: &str) -> Category {
        self.utterances
            .first_match(&normalize(utterance))
            .unwrap_or(Category::General)
    }

    /// Infer the category of composed reply text from its emoji and keyword
    /// markers. Falls back to `General`.
    pub fn infer_category(&self, text: &str) -> Category {
        self.markers
            .first_match(&normalize(text))
            .unwrap_or(Category::General)
    }

    /// Every catalog keyword found in the utterance, in priority order.
    pub fn matched_keywords(&self, utterance: &str) -> Vec<(Category, &'static str)> {
        let normalized = normalize(utterance);
        let catalog: &'static KeywordCatalog = self.utterances;
        let mut hits = Vec::new();
        for rule in catalog.rules() {
            for keyword in rule.keywords() {
                if normalized.contains(keyword.as_str()) {
                    hits.push((rule.category, keyword.as_str()));
                }
            }
        }
        hits
    }
}
