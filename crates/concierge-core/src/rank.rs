//! Lexical ranker: additive, substring-based scoring over title, body, and
//! keywords.
//!
//! The ranker operates on a [`LexicalIndex`], which holds each
//! [`ContentItem`] next to lower-cased copies of its searchable fields so
//! that repeated queries against the same corpus do not re-lower the text.
//!
//! # Scoring
//!
//! Given the normalized query `q` (trimmed, lower-cased) and its
//! whitespace-separated terms:
//!
//! | Signal | Points |
//! |--------|--------|
//! | title contains `q` as a whole | `title_phrase` (10) |
//! | per term: title contains term | `title_term` (5) |
//! | per term: body contains term | `body_term` (3) |
//! | per term: any keyword contains term | `keyword_term` (4) |
//!
//! Terms are not de-duplicated: a term typed twice scores twice. Matching is
//! plain substring containment, so `"투자"` hits `"투자자"`.
//!
//! Items scoring zero are dropped. The rest are sorted by descending score
//! with a stable sort, so ties keep corpus order (first seen wins).

use serde::Serialize;

use crate::models::ContentItem;

/// Score weights. Defaults are the hand-tuned production values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
    pub title_phrase: u32,
    pub title_term: u32,
    pub body_term: u32,
    pub keyword_term: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            title_phrase: 10,
            title_term: 5,
            body_term: 3,
            keyword_term: 4,
        }
    }
}

/// Which signals fired for one item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub title_phrase: bool,
    pub title_hits: u32,
    pub body_hits: u32,
    pub keyword_hits: u32,
}

impl ScoreBreakdown {
    pub fn total(&self, weights: &ScoreWeights) -> u32 {
        let phrase = if self.title_phrase {
            weights.title_phrase
        } else {
            0
        };
        // Saturates rather than wrapping on oversized weights.
        phrase
            .saturating_add(self.title_hits.saturating_mul(weights.title_term))
            .saturating_add(self.body_hits.saturating_mul(weights.body_term))
            .saturating_add(self.keyword_hits.saturating_mul(weights.keyword_term))
    }
}

/// A scored item. Only ever produced with `score > 0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub item: ContentItem,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain: Option<ScoreBreakdown>,
}

/// A query in the form the scorer consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    pub phrase: String,
    pub terms: Vec<String>,
}

impl NormalizedQuery {
    pub fn parse(query: &str) -> Self {
        let phrase = query.trim().to_lowercase();
        let terms = phrase.split_whitespace().map(str::to_string).collect();
        Self { phrase, terms }
    }

    pub fn is_empty(&self) -> bool {
        self.phrase.is_empty()
    }
}

struct IndexedItem {
    item: ContentItem,
    title: String,
    body: String,
    keywords: Vec<String>,
}

impl IndexedItem {
    fn new(item: ContentItem) -> Self {
        Self {
            title: item.title.to_lowercase(),
            body: item.body.to_lowercase(),
            keywords: item.keywords.iter().map(|k| k.to_lowercase()).collect(),
            item,
        }
    }

    fn breakdown(&self, query: &NormalizedQuery) -> ScoreBreakdown {
        let mut b = ScoreBreakdown {
            title_phrase: self.title.contains(&query.phrase),
            ..ScoreBreakdown::default()
        };
        for term in &query.terms {
            if self.title.contains(term.as_str()) {
                b.title_hits += 1;
            }
            if self.body.contains(term.as_str()) {
                b.body_hits += 1;
            }
            if self.keywords.iter().any(|k| k.contains(term.as_str())) {
                b.keyword_hits += 1;
            }
        }
        b
    }
}

/// Items in corpus order with pre-lowered searchable text.
pub struct LexicalIndex {
    entries: Vec<IndexedItem>,
}

impl LexicalIndex {
    pub fn build(items: Vec<ContentItem>) -> Self {
        Self {
            entries: items.into_iter().map(IndexedItem::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &ContentItem> {
        self.entries.iter().map(|e| &e.item)
    }

    /// Score every item and return the non-zero ones, best first.
    ///
    /// An empty (or whitespace-only) query matches nothing.
    pub fn rank(&self, query: &str, weights: &ScoreWeights, explain: bool) -> Vec<RankedResult> {
        let query = NormalizedQuery::parse(query);
        if query.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<RankedResult> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let breakdown = entry.breakdown(&query);
                let score = breakdown.total(weights);
                if score == 0 {
                    return None;
                }
                Some(RankedResult {
                    item: entry.item.clone(),
                    score,
                    explain: explain.then_some(breakdown),
                })
            })
            .collect();

        // `sort_by` is stable: equal scores keep corpus order.
        results.sort_by(|a, b| b.score.cmp(&a.score));
        results
    }
}

/// Rank a plain item slice without keeping an index around.
pub fn rank(query: &str, items: &[ContentItem], weights: &ScoreWeights) -> Vec<RankedResult> {
    LexicalIndex::build(items.to_vec()).rank(query, weights, false)
}

/// Score a single item against a query.
pub fn score(item: &ContentItem, query: &str, weights: &ScoreWeights) -> u32 {
    let query = NormalizedQuery::parse(query);
    if query.is_empty() {
        return 0;
    }
    IndexedItem::new(item.clone())
        .breakdown(&query)
        .total(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentKind;

    fn item(id: &str, title: &str, body: &str) -> ContentItem {
        ContentItem::new(id, ContentKind::Static, title, body)
    }

    fn ids(results: &[RankedResult]) -> Vec<&str> {
        results.iter().map(|r| r.item.id.as_str()).collect()
    }

    #[test]
    fn test_title_phrase_bonus_and_terms() {
        let w = ScoreWeights::default();
        let faq = item(
            "faq-1",
            "최소 투자 금액은 얼마인가요?",
            "최소 투자 금액은 10만원입니다.",
        );
        // phrase 10 + 4 terms in title (20) + 3 terms in body (9)
        assert_eq!(score(&faq, "최소 투자 금액은 얼마인가요?", &w), 39);
    }

    #[test]
    fn test_phrase_bonus_requires_literal_substring() {
        let w = ScoreWeights::default();
        let it = item("a", "Gangnam Premium Office", "");
        // both terms hit the title, but "gangnam office" is not a substring
        let results = LexicalIndex::build(vec![it]).rank("gangnam office", &w, true);
        let ex = results[0].explain.clone().unwrap();
        assert!(!ex.title_phrase);
        assert_eq!(ex.title_hits, 2);
        assert_eq!(results[0].score, 10);
    }

    #[test]
    fn test_phrase_bonus_is_case_insensitive() {
        let w = ScoreWeights::default();
        let it = item("a", "Premium OFFICE Tower", "");
        assert_eq!(score(&it, "  premium office ", &w), 10 + 5 + 5);
    }

    #[test]
    fn test_keyword_only_match_is_positive() {
        let w = ScoreWeights::default();
        let items = vec![
            item("a", "alpha", "nothing here"),
            item("b", "beta", "nothing here").with_keywords(["rooftop"]),
        ];
        let results = rank("rooftop", &items, &w);
        assert_eq!(ids(&results), vec!["b"]);
        assert_eq!(results[0].score, 4);
    }

    #[test]
    fn test_zero_score_items_excluded() {
        let w = ScoreWeights::default();
        let items = vec![item("a", "alpha", "one"), item("b", "beta", "two")];
        assert!(rank("gamma", &items, &w).is_empty());
    }

    #[test]
    fn test_stable_tie_break_keeps_corpus_order() {
        let w = ScoreWeights::default();
        let items = vec![
            item("first", "x", "shared word"),
            item("second", "y", "shared word"),
            item("third", "z", "shared word"),
        ];
        let results = rank("shared", &items, &w);
        assert_eq!(ids(&results), vec!["first", "second", "third"]);
        assert!(results.iter().all(|r| r.score == 3));
    }

    #[test]
    fn test_sorted_descending() {
        let w = ScoreWeights::default();
        let items = vec![
            item("body", "x", "office"),
            item("title", "office", ""),
            item("kw", "y", "").with_keywords(["office"]),
        ];
        let results = rank("office", &items, &w);
        assert_eq!(ids(&results), vec!["title", "kw", "body"]);
        assert_eq!(
            results.iter().map(|r| r.score).collect::<Vec<_>>(),
            vec![15, 4, 3]
        );
    }

    #[test]
    fn test_repeated_terms_score_twice() {
        let w = ScoreWeights::default();
        let it = item("a", "x", "token");
        assert_eq!(score(&it, "token", &w), 3);
        assert_eq!(score(&it, "token token", &w), 6);
    }

    #[test]
    fn test_partial_word_matches() {
        let w = ScoreWeights::default();
        let it = item("a", "x", "투자자 보호 정책");
        assert_eq!(score(&it, "투자", &w), 3);
    }

    #[test]
    fn test_keyword_counted_once_per_term() {
        let w = ScoreWeights::default();
        let it = item("a", "x", "").with_keywords(["office", "office space"]);
        assert_eq!(score(&it, "office", &w), 4);
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let w = ScoreWeights::default();
        let items = vec![item("a", "alpha", "beta")];
        assert!(rank("   ", &items, &w).is_empty());
    }

    #[test]
    fn test_custom_weights() {
        let w = ScoreWeights {
            title_phrase: 0,
            title_term: 1,
            body_term: 1,
            keyword_term: 1,
        };
        let it = item("a", "office", "office").with_keywords(["office"]);
        assert_eq!(score(&it, "office", &w), 3);
    }

    #[test]
    fn test_huge_weights_saturate() {
        let w = ScoreWeights {
            title_phrase: u32::MAX,
            title_term: u32::MAX,
            body_term: u32::MAX,
            keyword_term: u32::MAX,
        };
        let it = item("a", "office", "office").with_keywords(["office"]);
        assert_eq!(score(&it, "office", &w), u32::MAX);

        let ranked = LexicalIndex::build(vec![it, item("b", "other", "")]).rank("office", &w, false);
        assert_eq!(ids(&ranked), vec!["a"]);
    }

    #[test]
    fn test_explain_only_when_requested() {
        let w = ScoreWeights::default();
        let index = LexicalIndex::build(vec![item("a", "alpha", "")]);
        assert!(index.rank("alpha", &w, false)[0].explain.is_none());
        assert!(index.rank("alpha", &w, true)[0].explain.is_some());
    }
}
