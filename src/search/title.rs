use rapidfuzz::distance::jaro_winkler;
use serde::{Deserialize, Serialize};

use crate::core::GameId;

/// Titles below this Jaro-Winkler similarity are not returned
pub const MIN_TITLE_SIMILARITY: f64 = 0.85;

/// One title search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleHit {
    pub id: GameId,
    pub title: String,
    /// 1.0 for substring matches, Jaro-Winkler similarity otherwise
    pub similarity: f64,
}

/// Case-insensitive title matcher: substring first, typo-tolerant fallback
#[derive(Debug, Clone)]
pub struct TitleMatcher {
    min_similarity: f64,
}

impl TitleMatcher {
    pub fn new() -> Self {
        Self {
            min_similarity: MIN_TITLE_SIMILARITY,
        }
    }

    pub fn with_min_similarity(min_similarity: f64) -> Self {
        Self { min_similarity }
    }

    /// Similarity of `query` to `title`, both already lowercased
    fn similarity(query: &str, title: &str) -> f64 {
        if title.contains(query) {
            return 1.0;
        }
        jaro_winkler::normalized_similarity(query.chars(), title.chars())
    }

    /// Rank titles against the query, highest similarity first, then alphabetically
    pub fn rank<I>(&self, query: &str, titles: I, limit: usize) -> Vec<TitleHit>
    where
        I: IntoIterator<Item = (GameId, String)>,
    {
        let query_lower = query.trim().to_lowercase();
        if query_lower.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits: Vec<TitleHit> = titles
            .into_iter()
            .filter_map(|(id, title)| {
                let similarity = Self::similarity(&query_lower, &title.to_lowercase());
                (similarity >= self.min_similarity).then_some(TitleHit { id, title, similarity })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.title.cmp(&b.title))
        });
        hits.truncate(limit);

        hits
    }
}

impl Default for TitleMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<(GameId, String)> {
        vec![
            (1, "Vampire Survivors".to_string()),
            (2, "Survivor.io".to_string()),
            (3, "Left 4 Dead".to_string()),
            (4, "Dead Cells".to_string()),
        ]
    }

    #[test]
    fn test_substring_is_case_insensitive() {
        let hits = TitleMatcher::new().rank("DEAD", catalog(), 10);
        let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();

        assert_eq!(titles, vec!["Dead Cells", "Left 4 Dead"]);
        assert!(hits.iter().all(|h| h.similarity == 1.0));
    }

    #[test]
    fn test_typo_still_matches() {
        let hits = TitleMatcher::new().rank("vampire survivers", catalog(), 10);
        assert_eq!(hits[0].title, "Vampire Survivors");
        assert!(hits[0].similarity < 1.0);
    }

    #[test]
    fn test_empty_query() {
        assert!(TitleMatcher::new().rank("   ", catalog(), 10).is_empty());
    }

    #[test]
    fn test_limit() {
        let hits = TitleMatcher::with_min_similarity(0.0).rank("game", catalog(), 2);
        assert_eq!(hits.len(), 2);
    }
}
