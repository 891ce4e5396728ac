//! Ranking of the whole candidate set against a query.
//!
//! Ranking is a full linear rescan on every call: nothing is cached between
//! queries, so the same query over the same candidates always produces the
//! same ordering.

use std::cmp::Ordering;
use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use itertools::Itertools;

use crate::history::{Candidates, HistoryEntry};

const FREQUENCY_WEIGHT: f64 = 0.6;
const RECENCY_WEIGHT: f64 = 0.3;

/// A candidate that matched the current query.
///
/// `match_positions` are character indices into `entry.text`, ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub entry: Arc<HistoryEntry>,
    pub score: f64,
    pub match_positions: Vec<usize>,
}

/// Normalises frequency and recency over a candidate set into `[0, 1)`.
///
/// The weight is added to integral match scores, so it only separates
/// entries whose match scores are equal.
struct SecondaryWeight {
    max_frequency: f64,
    oldest: u64,
    span: f64,
}

impl SecondaryWeight {
    fn over(candidates: &[Arc<HistoryEntry>]) -> Self {
        let max_frequency = candidates.iter().map(|e| e.frequency).max().unwrap_or(1);
        let (oldest, newest) = candidates
            .iter()
            .map(|e| e.last_used)
            .minmax()
            .into_option()
            .unwrap_or((0, 0));

        Self {
            max_frequency: f64::from(max_frequency.max(1)),
            oldest,
            span: (newest - oldest).max(1) as f64,
        }
    }

    fn of(&self, entry: &HistoryEntry) -> f64 {
        let frequency = f64::from(entry.frequency) / self.max_frequency;
        let recency = entry.last_used.saturating_sub(self.oldest) as f64 / self.span;
        FREQUENCY_WEIGHT * frequency + RECENCY_WEIGHT * recency
    }
}

/// The default ordering: frequency, then recency, both descending.
fn default_order(a: &HistoryEntry, b: &HistoryEntry) -> Ordering {
    b.frequency
        .cmp(&a.frequency)
        .then_with(|| b.last_used.cmp(&a.last_used))
}

/// Scores and orders `candidates` against `query`.
///
/// An empty query returns every candidate in the default order. Otherwise
/// only candidates the matcher accepts are returned, best first. Ties are
/// broken by original position, so the sort is total.
pub fn rank(
    matcher: &dyn FuzzyMatcher,
    query: &str,
    candidates: &[Arc<HistoryEntry>],
) -> Vec<ScoredEntry> {
    let weight = SecondaryWeight::over(candidates);

    if query.is_empty() {
        return candidates
            .iter()
            .enumerate()
            .sorted_by(|(i, a), (j, b)| default_order(a, b).then_with(|| i.cmp(j)))
            .map(|(_, entry)| ScoredEntry {
                entry: Arc::clone(entry),
                score: weight.of(entry),
                match_positions: Vec::new(),
            })
            .collect();
    }

    candidates
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let (score, positions) = matcher.fuzzy_indices(&entry.text, query)?;
            Some((
                i,
                ScoredEntry {
                    entry: Arc::clone(entry),
                    score: score as f64 + weight.of(entry),
                    match_positions: positions,
                },
            ))
        })
        .sorted_by(|(i, a), (j, b)| b.score.total_cmp(&a.score).then_with(|| i.cmp(j)))
        .map(|(_, scored)| scored)
        .collect()
}

/// A matcher bound to the candidate set of one session.
#[derive(Clone)]
pub struct Ranker {
    matcher: Arc<dyn FuzzyMatcher>,
    candidates: Candidates,
}

impl Ranker {
    pub fn new(matcher: Arc<dyn FuzzyMatcher>, candidates: Candidates) -> Self {
        Self {
            matcher,
            candidates,
        }
    }

    #[must_use]
    pub fn rank(&self, query: &str) -> Vec<ScoredEntry> {
        rank(self.matcher.as_ref(), query, &self.candidates)
    }

    /// A ranker over a fresh candidate set, as after a history reload.
    #[must_use]
    pub fn with_candidates(&self, candidates: Candidates) -> Self {
        Self {
            matcher: Arc::clone(&self.matcher),
            candidates,
        }
    }

    #[must_use]
    pub fn candidates(&self) -> &Candidates {
        &self.candidates
    }

    #[must_use]
    pub fn matcher(&self) -> Arc<dyn FuzzyMatcher> {
        Arc::clone(&self.matcher)
    }
}
