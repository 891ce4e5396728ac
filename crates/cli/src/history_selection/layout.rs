//! Pure row layout for the selection region.
//!
//! Nothing here touches the terminal. Every function returns [`Row`]s fitted
//! to a width in characters, which `ui` then draws.

use std::fmt::Display;

use hist_core::ranking::ScoredEntry;
use hist_core::session::SessionState;
use itertools::Itertools;
use unicode_width::UnicodeWidthChar;

use super::types::{Row, RowStyle, Segment};

const SELECTED_MARKER: &str = "> ";
const UNSELECTED_MARKER: &str = "  ";
const PROMPT: &str = "> ";
const CURSOR: char = '█';
const ELLIPSIS: char = '…';
const SEPARATOR: &str = " │ ";

/// Pad a value to match the width of the largest value
pub fn pad_to_width_of<T: Display>(value: T, max_number: usize) -> String {
    let width = format!("{max_number}").len();
    format!("{:>width$}", value.to_string())
}

/// Characters that would move the cursor are drawn as spaces so one history
/// entry always occupies one row.
fn printable(c: char) -> char {
    if c.is_control() {
        ' '
    } else {
        c
    }
}

/// Columns `c` occupies on the terminal.
fn column_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

fn cells_width(cells: &[(char, bool)]) -> usize {
    cells.iter().map(|(c, _)| column_width(*c)).sum()
}

/// Number of leading `cells` that fit in `width` columns.
fn fitting_prefix<'a>(cells: impl Iterator<Item = &'a (char, bool)>, width: usize) -> usize {
    let mut used = 0;
    cells
        .take_while(|(c, _)| {
            used += column_width(*c);
            used <= width
        })
        .count()
}

/// Cuts `cells` to `width` columns, marking a cut with an ellipsis.
fn fit(mut cells: Vec<(char, bool)>, width: usize) -> Vec<(char, bool)> {
    if cells_width(&cells) > width {
        let keep = fitting_prefix(cells.iter(), width.saturating_sub(1));
        cells.truncate(keep);
        if width > 0 {
            cells.push((ELLIPSIS, false));
        }
    }
    cells
}

/// Same as [`fit`], but keeps the end of `cells` visible.
fn fit_tail(mut cells: Vec<(char, bool)>, width: usize) -> Vec<(char, bool)> {
    if cells_width(&cells) > width {
        let keep = fitting_prefix(cells.iter().rev(), width.saturating_sub(1));
        cells.drain(..cells.len() - keep);
        if width > 0 {
            cells.insert(0, (ELLIPSIS, false));
        }
    }
    cells
}

fn plain_cells(text: &str) -> Vec<(char, bool)> {
    text.chars().map(|c| (printable(c), false)).collect()
}

fn to_segments(cells: Vec<(char, bool)>) -> Vec<Segment> {
    cells
        .into_iter()
        .chunk_by(|(_, highlighted)| *highlighted)
        .into_iter()
        .map(|(highlighted, chunk)| Segment {
            text: chunk.map(|(c, _)| c).collect(),
            highlighted,
        })
        .collect()
}

/// Lays out one ranked entry, highlighting the characters that matched.
#[must_use]
pub fn result_row(scored: &ScoredEntry, is_selected: bool, width: usize) -> Row {
    let marker = if is_selected {
        SELECTED_MARKER
    } else {
        UNSELECTED_MARKER
    };

    let mut cells = plain_cells(marker);
    cells.extend(scored.entry.text.chars().enumerate().map(|(i, c)| {
        let highlighted = scored.match_positions.binary_search(&i).is_ok();
        (printable(c), highlighted)
    }));

    Row {
        segments: to_segments(fit(cells, width)),
        style: if is_selected {
            RowStyle::Selected
        } else {
            RowStyle::Normal
        },
    }
}

fn prompt_cells(query: &str) -> Vec<(char, bool)> {
    let mut cells = plain_cells(PROMPT);
    cells.extend(plain_cells(query));
    cells.push((CURSOR, false));
    cells
}

/// Position of the selection out of the result count, e.g. ` 3/120`.
fn counter(state: &SessionState) -> String {
    let count = state.results().len();
    let position = state.selected_index().map_or(0, |i| i + 1);
    format!("{}/{count}", pad_to_width_of(position, count))
}

/// Lays out the search bar: the query followed by a cursor marker, with the
/// result counter right-aligned when there is room for it.
///
/// A query wider than the terminal is shown by its end so the cursor stays
/// visible.
#[must_use]
pub fn search_bar(state: &SessionState, width: usize) -> Row {
    let prompt = prompt_cells(state.query());
    let counter = counter(state);
    let counter_width = counter.chars().count();
    let prompt_width = cells_width(&prompt);

    let cells = if prompt_width + 1 + counter_width <= width {
        let mut cells = prompt;
        let padding = width - prompt_width - counter_width;
        cells.extend(std::iter::repeat((' ', false)).take(padding));
        cells.extend(plain_cells(&counter));
        cells
    } else {
        fit_tail(prompt, width)
    };

    Row {
        segments: to_segments(cells),
        style: RowStyle::Prompt,
    }
}

/// Lays out the query and the selected entry on a single row, for terminals
/// too small to hold the full region.
#[must_use]
pub fn single_line(state: &SessionState, width: usize) -> Row {
    let mut cells = prompt_cells(state.query());
    cells.extend(plain_cells(SEPARATOR));

    match state.selected() {
        Some(scored) => cells.extend(scored.entry.text.chars().enumerate().map(|(i, c)| {
            (printable(c), scored.match_positions.binary_search(&i).is_ok())
        })),
        None => cells.extend(plain_cells("no matches")),
    }

    Row {
        segments: to_segments(fit(cells, width)),
        style: RowStyle::Prompt,
    }
}

/// Lays out the result rows of the region, top to bottom.
///
/// Results sit directly above the search bar. When there are fewer visible
/// results than rows, the rows at the top are left blank.
#[must_use]
pub fn result_rows(state: &SessionState, rows: usize, width: usize) -> Vec<Row> {
    let visible: Vec<Row> = state
        .visible_results()
        .take(rows)
        .map(|(index, scored)| result_row(scored, state.selected_index() == Some(index), width))
        .collect();

    std::iter::repeat_with(Row::blank)
        .take(rows - visible.len())
        .chain(visible)
        .collect()
}
