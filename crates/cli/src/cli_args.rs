//! Command-line argument parsing.
//!
//! This module defines the command-line interface of the `hist` binary using
//! the `clap` crate.

use clap::Parser;
use hist_core::config::DEFAULT_VIEWPORT_HEIGHT;
use hist_core::matcher::MatcherKind;

/// Command-line arguments for the `hist` binary.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use hist_cli::cli_args::Args;
///
/// let args = Args::parse_from(["hist", "--height", "8", "--dry-run"]);
/// assert_eq!(args.height, 8);
/// assert!(args.dry_run);
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(term_width = 0)] // Just to make testing across clap features easier
#[allow(clippy::struct_excessive_bools)] // silence clippy's warning on this struct
pub struct Args {
    /// Number of result rows drawn above the search bar.
    #[arg(long, short = 'H', default_value_t = DEFAULT_VIEWPORT_HEIGHT)]
    pub height: usize,

    /// Match letter case exactly instead of ignoring it.
    #[arg(long, short = 's', action)]
    pub case_sensitive: bool,

    /// Scoring algorithm: `builtin` or `skim`.
    #[arg(long, default_value_t = MatcherKind::Builtin)]
    pub matcher: MatcherKind,

    /// History file to search. May be repeated.
    ///
    /// If not provided, `$HISTFILE` and the usual bash, zsh and fish history
    /// locations are read.
    #[arg(long = "history-file", short = 'f', action = clap::ArgAction::Append)]
    pub history_files: Vec<String>,

    /// Path to the file that stores how often commands were run from `hist`.
    ///
    /// If not provided, defaults to `~/.hist/frecency.yml`.
    #[arg(long)]
    pub frecency_path: Option<String>,

    /// Do not write usage of this session back to the frecency store.
    #[arg(long, action)]
    pub skip_frecency_save: bool,

    /// Shell used to run the chosen command.
    ///
    /// If not provided, `$SHELL` is used, falling back to `/bin/bash`.
    #[arg(long)]
    pub shell: Option<String>,

    /// Return to the search after the command finishes instead of exiting.
    #[arg(long, short = 'k', action)]
    pub keep_open: bool,

    /// Print the chosen command instead of running it.
    #[arg(long, short = 'd', action)]
    pub dry_run: bool,

    /// Ask before running the chosen command.
    #[arg(long, action)]
    pub confirm: bool,

    /// Rank on a worker thread so typing never waits on a long history.
    #[arg(long, action)]
    pub background_rank: bool,

    /// Color name used for matched characters, e.g. `yellow` or `darkcyan`.
    #[arg(long)]
    pub highlight_color: Option<String>,

    /// Write log output to this file instead of stderr.
    ///
    /// The level is still controlled by `RUST_LOG`.
    #[arg(long)]
    pub log_file: Option<String>,
}
