use std::io::{stdout, ErrorKind, Write};
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::style::Color::Reset;
use crossterm::style::{Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{event, execute, queue};
use hist_core::error::Result;
use hist_core::history::Candidates;
use hist_core::rank_worker::RankWorker;
use hist_core::ranking::Ranker;
use hist_core::session::{Outcome, SessionEvent, SessionState};
use log::{debug, info, warn};

use super::colors::Theme;
use super::input::map_event;
use super::layout;
use super::terminal::InlineRegion;
use super::types::{Action, Row, RowStyle, SelectionChoice};
use crate::signals::TerminationFlags;

/// How long to wait for input before checking signals and ranked results.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Settings that stay fixed for every run of the selection loop.
#[derive(Debug, Clone)]
pub struct SelectionOptions {
    /// Result rows requested above the search bar
    pub viewport_height: usize,
    pub background_rank: bool,
    pub theme: Theme,
}

/// Clear and write a row of the region
fn clear_and_write_row<W: Write>(
    out: &mut W,
    screen_row: u16,
    row: &Row,
    theme: &Theme,
) -> Result<()> {
    queue!(out, MoveTo(0, screen_row), Clear(ClearType::CurrentLine))?;

    let base_foreground = match row.style {
        RowStyle::Selected => {
            queue!(
                out,
                SetAttribute(Attribute::Bold),
                SetBackgroundColor(theme.selected_background),
                SetForegroundColor(theme.selected_foreground),
            )?;
            theme.selected_foreground
        }
        RowStyle::Prompt => {
            queue!(out, SetAttribute(Attribute::Bold))?;
            Reset
        }
        RowStyle::Normal => Reset,
    };

    for segment in &row.segments {
        if segment.highlighted {
            queue!(
                out,
                SetForegroundColor(theme.highlight),
                Print(&segment.text),
                SetForegroundColor(base_foreground),
            )?;
        } else {
            queue!(out, Print(&segment.text))?;
        }
    }

    queue!(
        out,
        SetAttribute(Attribute::Reset),
        SetBackgroundColor(Reset),
        SetForegroundColor(Reset),
    )?;

    Ok(())
}

/// Draws the whole region for `state`.
fn redraw_ui<W: Write>(
    out: &mut W,
    region: &InlineRegion,
    state: &SessionState,
    theme: &Theme,
) -> Result<()> {
    let width = region.width();

    if region.is_degraded() {
        clear_and_write_row(out, region.bar_row(), &layout::single_line(state, width), theme)?;
    } else {
        let rows = layout::result_rows(state, region.result_rows(), width);
        for (row, screen_row) in rows.iter().zip(region.top()..) {
            clear_and_write_row(out, screen_row, row, theme)?;
        }
        clear_and_write_row(out, region.bar_row(), &layout::search_bar(state, width), theme)?;
    }

    out.flush()?;
    Ok(())
}

/// Draws `state`, falling back to the single-line form if drawing fails.
fn redraw_or_degrade<W: Write>(
    out: &mut W,
    region: &mut InlineRegion,
    state: &SessionState,
    theme: &Theme,
) -> Result<()> {
    match redraw_ui(out, region, state, theme) {
        Err(e) if !region.is_degraded() => {
            warn!("Redraw failed, retrying on a single line: {e}");
            region.degrade();
            redraw_ui(out, region, state, theme)
        }
        result => result,
    }
}

/// Waits for a pending background scan so `state` reflects its own query.
fn settle_pending(worker: Option<&mut RankWorker>, state: SessionState) -> Result<SessionState> {
    let Some(worker) = worker.filter(|worker| worker.is_pending()) else {
        return Ok(state);
    };

    debug!("Waiting for ranking of `{}` before committing", state.query());
    let response = worker.wait_latest()?;
    Ok(state
        .accept_results(response.generation, response.results)
        .unwrap_or(state))
}

fn requested_rows(viewport_height: usize) -> u16 {
    u16::try_from(viewport_height.max(1) + 1).unwrap_or(u16::MAX)
}

/// Prompts the user to choose a command from their history.
///
/// The terminal is handed back before this returns, whatever the outcome.
/// `ranker` is updated when the user reloads the history, so a later run
/// starts from the reloaded candidates.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or read from, or if the
/// rank worker stops.
pub fn prompt_for_history_choice(
    ranker: &mut Ranker,
    options: &SelectionOptions,
    signals: &TerminationFlags,
    reload: &mut dyn FnMut() -> Candidates,
) -> Result<SelectionChoice> {
    let mut region = InlineRegion::reserve(requested_rows(options.viewport_height))?;
    let mut stdout = stdout();

    let mut worker = options
        .background_rank
        .then(|| RankWorker::spawn(ranker.clone()));

    let mut ui_state = SessionState::new(ranker, region.result_rows());
    let mut drawn_state: Option<SessionState> = None;

    loop {
        if signals.should_stop() {
            info!("Stopping selection on signal");
            return Ok(SelectionChoice::Quit);
        }

        if let Some(worker) = worker.as_mut() {
            if let Some(response) = worker.try_latest()? {
                if let Some(ranked) = ui_state.accept_results(response.generation, response.results) {
                    ui_state = ranked;
                }
            }
        }

        // Only redraw when the state changed
        if drawn_state.as_ref() != Some(&ui_state) {
            redraw_or_degrade(&mut stdout, &mut region, &ui_state, &options.theme)?;
            drawn_state = Some(ui_state.clone());
        }

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        let event = match event::read() {
            Ok(event) => event,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                debug!("Dropping undecodable input: {e}");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let Some(action) = map_event(&event) else {
            continue;
        };

        match action {
            Action::TerminalResized { width, height } => {
                let result_rows = region.resize(width, height);
                ui_state = ui_state.resize(result_rows);
                // The terminal may have reflowed the region, draw it again
                drawn_state = None;
            }
            Action::Reload => {
                *ranker = ranker.with_candidates(reload());
                if let Some(worker) = worker.as_ref() {
                    worker.replace_ranker(ranker.clone())?;
                }
                ui_state = ui_state.reload(ranker);
            }
            Action::Session(
                session_event @ (SessionEvent::Insert(_)
                | SessionEvent::Backspace
                | SessionEvent::ClearQuery),
            ) if worker.is_some() => {
                if let (Some(worker), Some(edited)) =
                    (worker.as_mut(), ui_state.edit_query(session_event))
                {
                    worker.submit(edited.generation(), edited.query())?;
                    ui_state = edited;
                }
            }
            Action::Session(session_event) => {
                if session_event == SessionEvent::Commit {
                    ui_state = settle_pending(worker.as_mut(), ui_state)?;
                }

                match ui_state.apply(session_event, ranker) {
                    Outcome::Continue(next) => {
                        if session_event == SessionEvent::Commit {
                            // Nothing selected
                            execute!(stdout, Print("\x07"))?;
                        }
                        ui_state = next;
                    }
                    Outcome::Commit(command) => {
                        info!("Selected `{command}`");
                        return Ok(SelectionChoice::Run(command));
                    }
                    Outcome::Cancel => return Ok(SelectionChoice::Quit),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hist_core::history::HistoryEntry;
    use hist_core::matcher::HistoryMatcher;

    use super::*;
    use crate::history_selection::types::Segment;

    fn ranker(entries: &[(&str, u32)]) -> Ranker {
        let candidates: Vec<Arc<HistoryEntry>> = entries
            .iter()
            .map(|(text, frequency)| Arc::new(HistoryEntry::new(*text, 0, *frequency)))
            .collect();
        Ranker::new(Arc::new(HistoryMatcher::default()), candidates.into())
    }

    #[test]
    fn test_commit_waits_for_pending_scan() {
        let ranker = ranker(&[("rm -rf build", 9), ("ls", 1)]);
        let mut worker = RankWorker::spawn(ranker.clone());
        let mut state = SessionState::new(&ranker, 5);

        // Typed faster than the worker answers
        for c in ['l', 's'] {
            state = state.edit_query(SessionEvent::Insert(c)).unwrap();
            worker.submit(state.generation(), state.query()).unwrap();
        }
        assert_eq!(state.selected().unwrap().entry.text, "rm -rf build");

        let state = settle_pending(Some(&mut worker), state).unwrap();
        assert!(!worker.is_pending());
        assert_eq!(
            state.apply(SessionEvent::Commit, &ranker),
            Outcome::Commit("ls".to_string())
        );
    }

    #[test]
    fn test_settle_without_worker_keeps_state() {
        let ranker = ranker(&[("ls", 1)]);
        let state = SessionState::new(&ranker, 5);
        assert_eq!(settle_pending(None, state.clone()).unwrap(), state);
    }

    #[test]
    fn test_requested_rows_adds_search_bar() {
        assert_eq!(requested_rows(15), 16);
        assert_eq!(requested_rows(0), 2);
        assert_eq!(requested_rows(usize::MAX / 2), u16::MAX);
    }

    #[test]
    fn test_write_row_emits_text_and_resets_style() {
        let row = Row {
            segments: vec![
                Segment {
                    text: "> ".to_string(),
                    highlighted: false,
                },
                Segment {
                    text: "gc".to_string(),
                    highlighted: true,
                },
            ],
            style: RowStyle::Selected,
        };

        let mut out = Vec::new();
        clear_and_write_row(&mut out, 3, &row, &Theme::default()).unwrap();
        let written = String::from_utf8(out).unwrap();

        assert!(written.contains("> "));
        assert!(written.contains("gc"));
        // Ends by resetting colors so nothing leaks past the row
        assert!(written.ends_with("\u{1b}[39m"));
    }
}
