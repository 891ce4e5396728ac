//! Hist Core Library
//!
//! This crate provides the core functionality for hist, a tool that lets
//! the user fuzzy-search their shell history and run the chosen command
//! again. Everything here is free of terminal I/O; the interactive loop
//! lives in `hist-cli`.
//!
//! # Key Features
//!
//! - **History Loading**: Parse bash, zsh and fish history into distinct,
//!   frequency-annotated entries
//! - **Fuzzy Ranking**: Subsequence matching with contiguity and word-start
//!   bonuses, frequency/recency as a tiebreak
//! - **Session State**: Pure transitions for query edits, selection and
//!   scrolling
//! - **Background Ranking**: Optional worker that discards superseded scans
//! - **Frecency Store**: Usage counts persisted between runs
//!
//! # Examples
//!
//! Ranking a small history:
//!
//! ```
//! use std::sync::Arc;
//! use hist_core::history::HistoryEntry;
//! use hist_core::matcher::HistoryMatcher;
//! use hist_core::ranking::rank;
//!
//! let candidates = vec![
//!     Arc::new(HistoryEntry::new("git status", 0, 1)),
//!     Arc::new(HistoryEntry::new("git commit", 0, 1)),
//! ];
//! let results = rank(&HistoryMatcher::default(), "gc", &candidates);
//! assert_eq!(results[0].entry.text, "git commit");
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod frecency;
pub mod history;
pub mod matcher;
pub mod rank_worker;
pub mod ranking;
pub mod session;
