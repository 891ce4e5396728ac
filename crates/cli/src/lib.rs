//! Hist CLI Library
//!
//! This crate provides the command-line interface for hist: fuzzy search over
//! shell history drawn inline in the terminal, then running the chosen
//! command through the user's shell.
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`history_selection`]: The inline selection loop, input decoding and
//!   row layout
//! - [`signals`]: Termination flags checked by the selection loop
//!
//! # Examples
//!
//! ```bash
//! # Search every default history file
//! hist
//!
//! # Search one file, keep searching after each command
//! hist --history-file ~/.zsh_history --keep-open
//!
//! # Only print the chosen command
//! hist --dry-run
//! ```

pub mod cli_args;
pub mod history_selection;
pub mod signals;
