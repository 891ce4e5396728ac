//! Type definitions for history selection.
//!
//! This module defines what the selection loop hands back to `main`, the
//! actions decoded from terminal input, and the rows the layout functions
//! produce for drawing.

use hist_core::session::SessionEvent;
use unicode_width::UnicodeWidthStr;

/// What the user chose in one run of the selection loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChoice {
    /// Run this command string
    Run(String),
    Quit,
}

/// Represents the user's choice when confirming a command run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunChoice {
    Yes,
    No,
}

/// Decoded terminal input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Session(SessionEvent),
    /// Re-read the history files and re-rank the current query
    Reload,
    TerminalResized { width: u16, height: u16 },
}

/// How a drawn row is styled as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Normal,
    Selected,
    Prompt,
}

/// A run of characters drawn with the same highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// One terminal row, already fitted to the terminal width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub segments: Vec<Segment>,
    pub style: RowStyle,
}

impl Row {
    #[must_use]
    pub fn blank() -> Self {
        Self {
            segments: Vec::new(),
            style: RowStyle::Normal,
        }
    }

    /// The row's text without styling.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Width of the row in terminal columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.segments.iter().map(|s| s.text.width()).sum()
    }

    /// The characters drawn with the match highlight.
    #[must_use]
    pub fn highlighted_text(&self) -> String {
        self.segments
            .iter()
            .filter(|s| s.highlighted)
            .map(|s| s.text.as_str())
            .collect()
    }
}
