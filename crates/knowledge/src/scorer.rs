//! Keyword relevance scoring.
//!
//! Every entry is scored against the lower-cased query:
//!
//! - each whitespace-separated title word longer than 3 characters that
//!   occurs anywhere in the query adds [`TITLE_WORD_WEIGHT`]
//! - each keyword longer than 3 characters that occurs in the query adds
//!   [`KEYWORD_WEIGHT`]
//!
//! Matching is by substring, so "blisters" in a query matches the title
//! word "blister". Entries that match nothing keep a score of 0 and stay in
//! the ranking.

use tensive_core::KnowledgeEntry;

/// Points for each matching title word.
pub const TITLE_WORD_WEIGHT: u32 = 3;

/// Points for each matching keyword.
pub const KEYWORD_WEIGHT: u32 = 1;

/// Terms of this many characters or fewer never score.
const MAX_IGNORED_TERM_CHARS: usize = 3;

/// An entry paired with its relevance score for one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMatch<'a> {
    pub entry: &'a KnowledgeEntry,
    pub score: u32,
}

/// Rank the whole corpus against `query`.
///
/// The result has one match per entry, ordered by descending score. Equal
/// scores keep corpus order (`sort_by` is stable).
pub fn score<'a>(query: &str, corpus: &'a [KnowledgeEntry]) -> Vec<ScoredMatch<'a>> {
    let normalized = query.to_lowercase();

    let mut ranked: Vec<ScoredMatch<'a>> = corpus
        .iter()
        .map(|entry| ScoredMatch {
            entry,
            score: score_entry(&normalized, entry),
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Score a single entry against an already lower-cased query.
pub fn score_entry(normalized_query: &str, entry: &KnowledgeEntry) -> u32 {
    if normalized_query.is_empty() {
        return 0;
    }

    let title = entry.title.to_lowercase();
    let title_hits = title
        .split_whitespace()
        .filter(|word| counts(word) && normalized_query.contains(word))
        .count() as u32;

    let keyword_hits = entry
        .keywords
        .iter()
        .filter(|k| counts(k) && normalized_query.contains(k.as_str()))
        .count() as u32;

    title_hits * TITLE_WORD_WEIGHT + keyword_hits * KEYWORD_WEIGHT
}

fn counts(term: &str) -> bool {
    term.chars().count() > MAX_IGNORED_TERM_CHARS
}
