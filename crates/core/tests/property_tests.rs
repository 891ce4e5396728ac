//! Property-based tests for ranking and session invariants.
//!
//! Verifies:
//! 1. Every ranked result is a subsequence match of the query
//! 2. Ranking is deterministic for identical input
//! 3. Insert followed by Backspace restores the previous results
//! 4. Selection and scroll invariants survive any sequence of transitions
//! 5. Match positions are ascending and point at the query's characters
//! 6. A more contiguous match that starts earlier never ranks below another

use std::sync::Arc;

use hist_core::history::HistoryEntry;
use hist_core::matcher::{build_matcher, is_subsequence, HistoryMatcher, MatcherKind};
use hist_core::ranking::{rank, Ranker};
use hist_core::session::{Outcome, SessionEvent, SessionState};
use fuzzy_matcher::FuzzyMatcher;
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_text() -> impl Strategy<Value = String> {
    "[a-dA-D /_-]{0,12}"
}

fn arb_query() -> impl Strategy<Value = String> {
    "[a-dA-D -]{0,4}"
}

fn arb_candidates() -> impl Strategy<Value = Vec<Arc<HistoryEntry>>> {
    prop::collection::vec((arb_text(), 1u32..20, 0u64..1000), 0..16).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(text, frequency, last_used)| Arc::new(HistoryEntry::new(text, last_used, frequency)))
            .collect()
    })
}

fn arb_event() -> impl Strategy<Value = SessionEvent> {
    prop_oneof![
        prop::char::range('a', 'd').prop_map(SessionEvent::Insert),
        Just(SessionEvent::Insert(' ')),
        Just(SessionEvent::Backspace),
        Just(SessionEvent::ClearQuery),
        Just(SessionEvent::MoveUp),
        Just(SessionEvent::MoveDown),
        (0usize..8).prop_map(SessionEvent::Resize),
        Just(SessionEvent::Reload),
        Just(SessionEvent::Commit),
    ]
}

/// A text holding `query` contiguously after `lead`, and a text holding it
/// later with every character on a word boundary.
fn arb_contiguous_and_scattered() -> impl Strategy<Value = (String, String, String)> {
    (
        "[a-d]{2,4}",
        "[e-h]{0,3}",
        "[e-h]{0,2}",
        "[e-h /_-]{0,4}",
        prop::collection::vec(prop::sample::select(vec![' ', '/', '-', '_']), 4),
    )
        .prop_map(|(query, lead, extra_lead, tail, separators)| {
            let contiguous = format!("{lead}{query}{tail}");
            let mut scattered = format!("{lead}{extra_lead}");
            for (c, separator) in query.chars().zip(separators) {
                scattered.push(separator);
                scattered.push(c);
            }
            scattered.push_str(&tail);
            (query, contiguous, scattered)
        })
}

fn adjacent_pairs(positions: &[usize]) -> usize {
    positions.windows(2).filter(|w| w[1] == w[0] + 1).count()
}

proptest! {
    #[test]
    fn contiguous_earlier_match_never_ranks_below(
        (query, contiguous, scattered) in arb_contiguous_and_scattered(),
    ) {
        let matcher = HistoryMatcher::new(false);
        let (contiguous_score, contiguous_positions) =
            matcher.fuzzy_indices(&contiguous, &query).unwrap();
        let (scattered_score, scattered_positions) =
            matcher.fuzzy_indices(&scattered, &query).unwrap();
        prop_assume!(adjacent_pairs(&contiguous_positions) > adjacent_pairs(&scattered_positions));
        prop_assume!(contiguous_positions[0] < scattered_positions[0]);

        prop_assert!(contiguous_score > scattered_score);

        // Usage weight and list order both favour the scattered text
        let candidates = vec![
            Arc::new(HistoryEntry::new(scattered.clone(), 1000, 50)),
            Arc::new(HistoryEntry::new(contiguous.clone(), 0, 1)),
        ];
        let results = rank(&matcher, &query, &candidates);
        prop_assert_eq!(&results[0].entry.text, &contiguous);
    }

    #[test]
    fn ranked_results_are_subsequence_matches(
        candidates in arb_candidates(),
        query in arb_query(),
        case_sensitive in any::<bool>(),
    ) {
        for kind in [MatcherKind::Builtin, MatcherKind::Skim] {
            let matcher = build_matcher(kind, case_sensitive);
            for result in rank(matcher.as_ref(), &query, &candidates) {
                prop_assert!(is_subsequence(&result.entry.text, &query, case_sensitive));
            }
        }
    }

    #[test]
    fn builtin_matcher_accepts_every_subsequence(
        candidates in arb_candidates(),
        query in arb_query(),
    ) {
        let results = rank(&HistoryMatcher::new(false), &query, &candidates);
        let expected = candidates
            .iter()
            .filter(|c| is_subsequence(&c.text, &query, false))
            .count();
        prop_assert_eq!(results.len(), expected);
    }

    #[test]
    fn ranking_is_deterministic(candidates in arb_candidates(), query in arb_query()) {
        let matcher = HistoryMatcher::new(false);
        prop_assert_eq!(rank(&matcher, &query, &candidates), rank(&matcher, &query, &candidates));
    }

    #[test]
    fn match_positions_point_at_query_chars(candidates in arb_candidates(), query in arb_query()) {
        for result in rank(&HistoryMatcher::new(false), &query, &candidates) {
            let text: Vec<char> = result.entry.text.to_lowercase().chars().collect();
            let query: Vec<char> = query.to_lowercase().chars().collect();
            prop_assert_eq!(result.match_positions.len(), query.len());
            prop_assert!(result.match_positions.windows(2).all(|w| w[0] < w[1]));
            for (position, expected) in result.match_positions.iter().zip(query.iter()) {
                prop_assert_eq!(text[*position], *expected);
            }
        }
    }

    #[test]
    fn insert_then_backspace_restores_results(
        candidates in arb_candidates(),
        query in arb_query(),
        c in prop::char::range('a', 'd'),
    ) {
        let ranker = Ranker::new(build_matcher(MatcherKind::Builtin, false), candidates.into());
        let mut state = SessionState::new(&ranker, 5);
        for q in query.chars() {
            if let Outcome::Continue(next) = state.apply(SessionEvent::Insert(q), &ranker) {
                state = next;
            }
        }

        let Outcome::Continue(typed) = state.apply(SessionEvent::Insert(c), &ranker) else {
            panic!("Insert must continue");
        };
        let Outcome::Continue(restored) = typed.apply(SessionEvent::Backspace, &ranker) else {
            panic!("Backspace must continue");
        };
        prop_assert_eq!(restored.results(), state.results());
    }

    #[test]
    fn invariants_hold_after_any_transitions(
        candidates in arb_candidates(),
        height in 0usize..6,
        events in prop::collection::vec(arb_event(), 0..40),
    ) {
        let ranker = Ranker::new(build_matcher(MatcherKind::Builtin, false), candidates.into());
        let mut state = SessionState::new(&ranker, height);
        prop_assert!(state.invariants_hold());

        for event in events {
            match state.apply(event, &ranker) {
                Outcome::Continue(next) => state = next,
                Outcome::Commit(command) => {
                    prop_assert_eq!(Some(command.as_str()), state.commit());
                }
                Outcome::Cancel => unreachable!("Cancel is never generated"),
            }
            prop_assert!(state.invariants_hold());
        }
    }
}
