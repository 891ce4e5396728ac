//! Session state for the interactive search.
//!
//! A [`SessionState`] is never mutated in place. Every transition borrows
//! the current state and returns a new one, so the selection loop can compare
//! old and new states to decide whether a redraw is needed.
//!
//! Two invariants hold after every transition:
//!
//! - `selected_index` is `Some(i)` with `i < results.len()` when there are
//!   results, and `None` when there are none;
//! - `scroll_offset <= i < scroll_offset + viewport_height` for a selection
//!   `i`, and `scroll_offset == 0` without one.

use crate::ranking::{Ranker, ScoredEntry};

/// Input to a session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Insert(char),
    Backspace,
    ClearQuery,
    MoveUp,
    MoveDown,
    Resize(usize),
    Reload,
    Commit,
    Cancel,
}

/// What the selection loop should do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue(SessionState),
    Commit(String),
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    query: String,
    selected_index: Option<usize>,
    scroll_offset: usize,
    results: Vec<ScoredEntry>,
    viewport_height: usize,
    /// Identifies the query the current results were requested for.
    generation: u64,
}

impl SessionState {
    /// The state at startup: empty query, every candidate in default order.
    #[must_use]
    pub fn new(ranker: &Ranker, viewport_height: usize) -> Self {
        Self::with_results(String::new(), ranker.rank(""), viewport_height, 0)
    }

    fn with_results(
        query: String,
        results: Vec<ScoredEntry>,
        viewport_height: usize,
        generation: u64,
    ) -> Self {
        let selected_index = if results.is_empty() { None } else { Some(0) };
        Self {
            query,
            selected_index,
            scroll_offset: 0,
            results,
            viewport_height: viewport_height.max(1),
            generation,
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    #[must_use]
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    #[must_use]
    pub fn results(&self) -> &[ScoredEntry] {
        &self.results
    }

    #[must_use]
    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn selected(&self) -> Option<&ScoredEntry> {
        self.selected_index.and_then(|i| self.results.get(i))
    }

    /// The results inside the viewport, with their absolute indexes.
    pub fn visible_results(&self) -> impl Iterator<Item = (usize, &ScoredEntry)> {
        self.results
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(self.viewport_height)
    }

    /// Checks both state invariants.
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        match self.selected_index {
            None => self.results.is_empty() && self.scroll_offset == 0,
            Some(i) => {
                i < self.results.len()
                    && self.scroll_offset <= i
                    && i < self.scroll_offset + self.viewport_height
            }
        }
    }

    /// Applies `event`, re-ranking through `ranker` when the query changes.
    #[must_use]
    pub fn apply(&self, event: SessionEvent, ranker: &Ranker) -> Outcome {
        match event {
            SessionEvent::Insert(_) | SessionEvent::Backspace | SessionEvent::ClearQuery => {
                match self.edit_query(event) {
                    Some(edited) => Outcome::Continue(edited.rerank(ranker)),
                    None => Outcome::Continue(self.clone()),
                }
            }
            SessionEvent::MoveUp => Outcome::Continue(self.move_up()),
            SessionEvent::MoveDown => Outcome::Continue(self.move_down()),
            SessionEvent::Resize(height) => Outcome::Continue(self.resize(height)),
            SessionEvent::Reload => Outcome::Continue(self.reload(ranker)),
            SessionEvent::Commit => match self.commit() {
                Some(command) => Outcome::Commit(command.to_string()),
                None => Outcome::Continue(self.clone()),
            },
            SessionEvent::Cancel => Outcome::Cancel,
        }
    }

    /// Changes the query without re-ranking, starting a new generation.
    ///
    /// Returns `None` when the event leaves the query unchanged, such as a
    /// backspace on an empty query. The previous results stay in place until
    /// [`SessionState::accept_results`] supplies ranked ones.
    #[must_use]
    pub fn edit_query(&self, event: SessionEvent) -> Option<Self> {
        let mut query = self.query.clone();
        match event {
            SessionEvent::Insert(c) => query.push(c),
            SessionEvent::Backspace => {
                query.pop()?;
            }
            SessionEvent::ClearQuery if !query.is_empty() => query.clear(),
            _ => return None,
        }

        Some(Self {
            query,
            generation: self.generation + 1,
            ..self.clone()
        })
    }

    /// Replaces the results with `results` if they were ranked for the
    /// current generation; stale results are ignored.
    #[must_use]
    pub fn accept_results(&self, generation: u64, results: Vec<ScoredEntry>) -> Option<Self> {
        if generation != self.generation {
            return None;
        }

        Some(Self::with_results(
            self.query.clone(),
            results,
            self.viewport_height,
            generation,
        ))
    }

    /// Re-ranks the current query and resets the selection to the top.
    #[must_use]
    pub fn rerank(&self, ranker: &Ranker) -> Self {
        Self::with_results(
            self.query.clone(),
            ranker.rank(&self.query),
            self.viewport_height,
            self.generation,
        )
    }

    /// Re-ranks after the candidate set changed. Results still in flight for
    /// the old candidates belong to an earlier generation and are dropped.
    #[must_use]
    pub fn reload(&self, ranker: &Ranker) -> Self {
        Self::with_results(
            self.query.clone(),
            ranker.rank(&self.query),
            self.viewport_height,
            self.generation + 1,
        )
    }

    /// Back to an empty query, as after running a command with the loop kept open.
    #[must_use]
    pub fn reset(&self, ranker: &Ranker) -> Self {
        Self::with_results(
            String::new(),
            ranker.rank(""),
            self.viewport_height,
            self.generation + 1,
        )
    }

    #[must_use]
    pub fn move_down(&self) -> Self {
        let Some(selected) = self.selected_index else {
            return self.clone();
        };

        let selected = (selected + 1).min(self.results.len() - 1);
        let mut scroll_offset = self.scroll_offset;
        if selected >= scroll_offset + self.viewport_height {
            scroll_offset = selected + 1 - self.viewport_height;
        }

        Self {
            selected_index: Some(selected),
            scroll_offset,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn move_up(&self) -> Self {
        let Some(selected) = self.selected_index else {
            return self.clone();
        };

        let selected = selected.saturating_sub(1);
        let scroll_offset = self.scroll_offset.min(selected);

        Self {
            selected_index: Some(selected),
            scroll_offset,
            ..self.clone()
        }
    }

    /// Changes the number of result rows and scrolls to keep the selection
    /// visible. Growing the viewport reveals more rows above the selection.
    #[must_use]
    pub fn resize(&self, viewport_height: usize) -> Self {
        let viewport_height = viewport_height.max(1);
        let mut scroll_offset = self.scroll_offset;

        if let Some(selected) = self.selected_index {
            if viewport_height > self.viewport_height {
                scroll_offset =
                    scroll_offset.saturating_sub(viewport_height - self.viewport_height);
            }
            if selected >= scroll_offset + viewport_height {
                scroll_offset = selected + 1 - viewport_height;
            }
        }

        Self {
            viewport_height,
            scroll_offset,
            ..self.clone()
        }
    }

    /// The command to run for the current selection, if any.
    #[must_use]
    pub fn commit(&self) -> Option<&str> {
        self.selected().map(|scored| scored.entry.text.as_str())
    }
}
