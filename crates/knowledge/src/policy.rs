//! Retrieval policy: how much of a ranking reaches the prompt and the caller.

use crate::scorer::ScoredMatch;
use tensive_core::{Assets, KnowledgeEntry};

/// Thresholds applied to a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalPolicy {
    /// Number of titles listed as related topics
    pub see_also_limit: usize,

    /// Minimum top score before the full entry is injected
    pub content_threshold: u32,

    /// Minimum top score before the entry's assets are released to the caller
    pub asset_threshold: u32,
}

impl Default for RetrievalPolicy {
    fn default() -> Self {
        Self {
            see_also_limit: 15,
            content_threshold: 4,
            asset_threshold: 6,
        }
    }
}

/// The top entry selected for full injection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grounding<'a> {
    pub entry: &'a KnowledgeEntry,
    pub score: u32,

    /// Whether the score also cleared the asset threshold
    pub assets_released: bool,
}

/// What one ranking contributes to a single turn.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Retrieval<'a> {
    /// Titles of the leading entries, zero scores included
    pub see_also: Vec<&'a str>,

    pub grounding: Option<Grounding<'a>>,
}

impl RetrievalPolicy {
    /// Apply the thresholds to a ranking ordered by descending score.
    pub fn select<'a>(&self, ranking: &[ScoredMatch<'a>]) -> Retrieval<'a> {
        let see_also = ranking
            .iter()
            .take(self.see_also_limit)
            .map(|m| m.entry.title.as_str())
            .collect();

        let grounding = ranking
            .first()
            .filter(|top| top.score >= self.content_threshold)
            .map(|top| Grounding {
                entry: top.entry,
                score: top.score,
                assets_released: top.score >= self.asset_threshold,
            });

        Retrieval {
            see_also,
            grounding,
        }
    }
}

impl<'a> Retrieval<'a> {
    /// Assets the caller may see for this turn.
    ///
    /// `None` unless the top entry cleared the asset threshold and actually
    /// links something.
    pub fn released_assets(&self) -> Option<&'a Assets> {
        self.grounding
            .filter(|g| g.assets_released)
            .and_then(|g| g.entry.assets.as_ref())
            .filter(|a| !a.is_empty())
    }
}
