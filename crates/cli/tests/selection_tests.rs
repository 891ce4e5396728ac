#[cfg(test)]
mod tests {
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use hist_cli::history_selection::layout::{result_rows, search_bar, single_line};
    use hist_cli::history_selection::{map_event, Action, Theme};
    use hist_core::history::HistoryEntry;
    use hist_core::matcher::{build_matcher, MatcherKind};
    use hist_core::ranking::Ranker;
    use hist_core::session::{Outcome, SessionState};
    use std::sync::Arc;

    fn ranker(entries: &[(&str, u32)]) -> Ranker {
        let candidates: Vec<Arc<HistoryEntry>> = entries
            .iter()
            .map(|(text, frequency)| Arc::new(HistoryEntry::new(*text, 0, *frequency)))
            .collect();
        Ranker::new(build_matcher(MatcherKind::Builtin, false), candidates.into())
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    /// Feeds terminal events through the same decoding and transitions the
    /// selection loop uses, stopping at the first commit or cancel.
    fn drive(ranker: &Ranker, height: usize, events: &[Event]) -> (SessionState, Option<Outcome>) {
        let mut state = SessionState::new(ranker, height);
        for event in events {
            let Some(Action::Session(session_event)) = map_event(event) else {
                continue;
            };
            match state.apply(session_event, ranker) {
                Outcome::Continue(next) => state = next,
                finished => return (state, Some(finished)),
            }
        }
        (state, None)
    }

    #[test]
    fn test_typing_and_enter_commits_best_match() {
        let ranker = ranker(&[("git status", 1), ("git commit", 1), ("docker ps", 1)]);
        let (_, outcome) = drive(
            &ranker,
            10,
            &[
                key(KeyCode::Char('g')),
                key(KeyCode::Char('c')),
                key(KeyCode::Enter),
            ],
        );
        assert_eq!(outcome, Some(Outcome::Commit("git commit".to_string())));
    }

    #[test]
    fn test_navigation_then_commit() {
        let ranker = ranker(&[("ls -la", 5), ("ls -l", 1)]);
        let (_, outcome) = drive(
            &ranker,
            10,
            &[key(KeyCode::Down), ctrl('p'), ctrl('n'), key(KeyCode::Enter)],
        );
        assert_eq!(outcome, Some(Outcome::Commit("ls -l".to_string())));
    }

    #[test]
    fn test_escape_cancels() {
        let ranker = ranker(&[("ls", 1)]);
        let (_, outcome) = drive(&ranker, 10, &[key(KeyCode::Char('l')), key(KeyCode::Esc)]);
        assert_eq!(outcome, Some(Outcome::Cancel));
    }

    #[test]
    fn test_enter_without_matches_keeps_running() {
        let ranker = ranker(&[("ls", 1)]);
        let (state, outcome) = drive(
            &ranker,
            10,
            &[key(KeyCode::Char('z')), key(KeyCode::Enter)],
        );
        assert_eq!(outcome, None);
        assert_eq!(state.query(), "z");
        assert_eq!(state.selected_index(), None);
    }

    #[test]
    fn test_clear_query_restores_default_order() {
        let ranker = ranker(&[("make", 1), ("cargo test", 3)]);
        let (state, _) = drive(
            &ranker,
            10,
            &[key(KeyCode::Char('m')), ctrl('u'), key(KeyCode::Backspace)],
        );
        assert_eq!(state.query(), "");
        assert_eq!(state.results()[0].entry.text, "cargo test");
    }

    #[test]
    fn test_drawn_region_for_a_query() {
        let ranker = ranker(&[("git status", 1), ("git commit", 1), ("docker ps", 1)]);
        let (state, _) = drive(&ranker, 3, &[key(KeyCode::Char('g')), key(KeyCode::Char('c'))]);

        let rows: Vec<String> = result_rows(&state, 3, 30)
            .iter()
            .map(|row| row.plain_text())
            .collect();
        assert_eq!(rows, vec!["", "", "> git commit"]);

        let bar = search_bar(&state, 30);
        assert!(bar.plain_text().starts_with("> gc█"));
        assert!(bar.plain_text().ends_with("1/1"));
        assert_eq!(bar.width(), 30);
    }

    #[test]
    fn test_single_line_region() {
        let ranker = ranker(&[("cargo build --release", 1)]);
        let (state, _) = drive(&ranker, 3, &[key(KeyCode::Char('c'))]);
        let row = single_line(&state, 16);
        assert_eq!(row.width(), 16);
        assert!(row.plain_text().starts_with("> c█ │ cargo"));
    }

    #[test]
    fn test_default_theme_is_valid() {
        assert_eq!(Theme::with_highlight(None).unwrap(), Theme::default());
    }
}
