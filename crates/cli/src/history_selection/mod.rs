//! Interactive history selection drawn inline below the prompt.
//!
//! This module provides the terminal side of `hist`: reserving a region of
//! the terminal, decoding keys into session events, laying out and drawing
//! the results, and confirming a command before it runs.
//!
//! # User Interface
//!
//! The interface supports:
//! - Typing to filter the history (fuzzy search)
//! - Up/Down or Ctrl-P/Ctrl-N to move the selection
//! - Enter to run the selected command
//! - Ctrl-U to clear the query, Ctrl-R to reload the history files
//! - Escape, Ctrl-C or Ctrl-G to quit

pub mod colors;
pub mod input;
pub mod layout;
pub mod terminal;
pub mod types;
pub mod ui;

// Re-exports for convenience
pub use colors::Theme;
pub use input::{confirm_command_should_run, map_event, print_executing_command};
pub use types::{Action, RunChoice, SelectionChoice};
pub use ui::{prompt_for_history_choice, SelectionOptions};
