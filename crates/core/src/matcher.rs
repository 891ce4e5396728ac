//! Fuzzy scoring of a single history entry against a query.
//!
//! [`HistoryMatcher`] finds the best alignment of the query as a subsequence
//! of the entry text. Every pair of adjacent matched characters earns a
//! contiguity bonus large enough to outweigh everything else, so a more
//! contiguous match always scores higher. Among equally contiguous matches,
//! a match at the start of the text or right after a separator earns a
//! boundary bonus, and skipped characters cost a small penalty, so word
//! starts and earlier matches score higher.
//!
//! The matcher implements [`FuzzyMatcher`], so it can be swapped for
//! [`SkimMatcherV2`] without touching the ranking code.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::error::Error;

// fuzzy-matcher keeps its own aliases private
type ScoreType = i64;
type IndexType = usize;

const SCORE_MATCH: ScoreType = 16;
const BONUS_START: ScoreType = 12;
const BONUS_BOUNDARY: ScoreType = 10;
/// Exceeds the boundary bonuses and gap penalties any text under a million
/// characters can collect, so one more adjacent pair always wins.
const BONUS_CONSECUTIVE: ScoreType = 1 << 24;
const PENALTY_GAP: ScoreType = 1;
const PENALTY_LEADING: ScoreType = 1;
const MAX_LEADING_PENALTY: ScoreType = 12;

/// Characters after which a match counts as the start of a word.
pub const SEPARATORS: [char; 4] = [' ', '/', '-', '_'];

/// Whether every character of `query` appears in `text`, in order.
#[must_use]
pub fn is_subsequence(text: &str, query: &str, case_sensitive: bool) -> bool {
    let mut text_chars = text.chars().map(|c| fold(c, case_sensitive));
    query
        .chars()
        .map(|c| fold(c, case_sensitive))
        .all(|q| text_chars.any(|t| t == q))
}

fn fold(c: char, case_sensitive: bool) -> char {
    if case_sensitive {
        c
    } else {
        c.to_lowercase().next().unwrap_or(c)
    }
}

fn position_bonus(text: &[char], position: usize) -> ScoreType {
    if position == 0 {
        BONUS_START
    } else if SEPARATORS.contains(&text[position - 1]) {
        BONUS_BOUNDARY
    } else {
        0
    }
}

/// The built-in history scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryMatcher {
    case_sensitive: bool,
}

impl HistoryMatcher {
    #[must_use]
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }

    /// Best-scoring alignment of `query` in `text`, both already folded.
    ///
    /// Cell `(i, j)` of `exact` holds the best score with `query[i]` matched
    /// at `text[j]`. Cell `(i, j)` of `best` holds the best score with
    /// `query[i]` matched anywhere up to `j`, less the gap to `j`.
    fn align(text: &[char], query: &[char]) -> Option<(ScoreType, Vec<IndexType>)> {
        let (n, m) = (text.len(), query.len());
        let cell = |i: usize, j: usize| i * n + j;

        let mut exact: Vec<Option<ScoreType>> = vec![None; m * n];
        let mut chained = vec![false; m * n];
        let mut best: Vec<Option<ScoreType>> = vec![None; m * n];
        let mut best_from = vec![0usize; m * n];

        for i in 0..m {
            for j in i..n {
                if query[i] == text[j] {
                    let bonus = position_bonus(text, j);
                    exact[cell(i, j)] = if i == 0 {
                        let leading = (j as ScoreType * PENALTY_LEADING).min(MAX_LEADING_PENALTY);
                        Some(SCORE_MATCH + bonus - leading)
                    } else {
                        let gapped = best[cell(i - 1, j - 1)].map(|s| s + SCORE_MATCH + bonus);
                        let consecutive = exact[cell(i - 1, j - 1)]
                            .map(|s| s + SCORE_MATCH + BONUS_CONSECUTIVE);

                        match (consecutive, gapped) {
                            (Some(c), Some(g)) if c >= g => {
                                chained[cell(i, j)] = true;
                                Some(c)
                            }
                            (Some(c), None) => {
                                chained[cell(i, j)] = true;
                                Some(c)
                            }
                            (_, gapped) => gapped,
                        }
                    };
                }

                let carried = if j > 0 {
                    best[cell(i, j - 1)].map(|s| s - PENALTY_GAP)
                } else {
                    None
                };

                match (exact[cell(i, j)], carried) {
                    (Some(e), Some(c)) if c > e => {
                        best[cell(i, j)] = Some(c);
                        best_from[cell(i, j)] = best_from[cell(i, j - 1)];
                    }
                    (Some(e), _) => {
                        best[cell(i, j)] = Some(e);
                        best_from[cell(i, j)] = j;
                    }
                    (None, Some(c)) => {
                        best[cell(i, j)] = Some(c);
                        best_from[cell(i, j)] = best_from[cell(i, j - 1)];
                    }
                    (None, None) => {}
                }
            }
        }

        // Trailing characters are free: take the best final match anywhere
        let (mut column, score) = (m - 1..n)
            .filter_map(|j| exact[cell(m - 1, j)].map(|s| (j, s)))
            .fold(None, |found: Option<(usize, ScoreType)>, (j, s)| match found {
                Some((_, top)) if top >= s => found,
                _ => Some((j, s)),
            })?;

        let mut positions = vec![0; m];
        positions[m - 1] = column;
        for i in (1..m).rev() {
            column = if chained[cell(i, column)] {
                column - 1
            } else {
                best_from[cell(i - 1, column - 1)]
            };
            positions[i - 1] = column;
        }

        Some((score, positions))
    }
}

impl FuzzyMatcher for HistoryMatcher {
    fn fuzzy_indices(&self, choice: &str, pattern: &str) -> Option<(ScoreType, Vec<IndexType>)> {
        let query: Vec<char> = pattern.chars().map(|c| fold(c, self.case_sensitive)).collect();
        if query.is_empty() {
            return Some((0, Vec::new()));
        }

        let text: Vec<char> = choice.chars().map(|c| fold(c, self.case_sensitive)).collect();

        // Cheap rejections before the quadratic pass
        if text.len() < query.len() {
            return None;
        }
        let mut remaining = text.iter();
        if !query.iter().all(|q| remaining.any(|t| t == q)) {
            return None;
        }

        Self::align(&text, &query)
    }

    fn fuzzy_match(&self, choice: &str, pattern: &str) -> Option<ScoreType> {
        self.fuzzy_indices(choice, pattern).map(|(score, _)| score)
    }
}

/// Which scoring algorithm ranks the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatcherKind {
    #[default]
    Builtin,
    Skim,
}

impl FromStr for MatcherKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "builtin" => Ok(MatcherKind::Builtin),
            "skim" => Ok(MatcherKind::Skim),
            _ => Err(Error::UnknownMatcher(value.to_string())),
        }
    }
}

impl Display for MatcherKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MatcherKind::Builtin => f.write_str("builtin"),
            MatcherKind::Skim => f.write_str("skim"),
        }
    }
}

/// Builds the matcher for `kind`, shared so a rank worker can use it too.
#[must_use]
pub fn build_matcher(kind: MatcherKind, case_sensitive: bool) -> Arc<dyn FuzzyMatcher> {
    match kind {
        MatcherKind::Builtin => Arc::new(HistoryMatcher::new(case_sensitive)),
        MatcherKind::Skim => {
            let matcher = SkimMatcherV2::default();
            let matcher = if case_sensitive {
                matcher.respect_case()
            } else {
                matcher.ignore_case()
            };
            Arc::new(matcher)
        }
    }
}
