//! Configuration path utilities for hist.
//!
//! This module resolves the history files to search, the frecency store
//! location and the shell used to run the chosen command. Shell expansions
//! like `~` are resolved for every path.

use std::env;
use std::path::PathBuf;

/// History files searched when none are given on the command line
const DEFAULT_HISTORY_PATHS: [&str; 3] = [
    "~/.bash_history",
    "~/.zsh_history",
    "~/.local/share/fish/fish_history",
];

/// Default path for the usage store written on exit
const DEFAULT_FRECENCY_PATH: &str = "~/.hist/frecency.yml";

/// Default shell to use for command execution
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Default number of result rows drawn above the search bar
pub const DEFAULT_VIEWPORT_HEIGHT: usize = 15;

/// Resolves the history files to read.
///
/// Explicit paths win. Otherwise `$HISTFILE` (when set) is read first,
/// followed by the usual bash, zsh and fish locations. Duplicates are
/// dropped so a file is never read twice.
///
/// # Examples
///
/// ```
/// use hist_core::config::get_history_paths;
///
/// let paths = get_history_paths(&["/tmp/my_history".to_string()], None);
/// assert_eq!(paths.len(), 1);
/// ```
#[must_use]
pub fn get_history_paths(explicit: &[String], histfile: Option<&str>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();

    let requested: Vec<&str> = if explicit.is_empty() {
        histfile
            .into_iter()
            .chain(DEFAULT_HISTORY_PATHS.iter().copied())
            .collect()
    } else {
        explicit.iter().map(String::as_str).collect()
    };

    for path in requested {
        let expanded = PathBuf::from(shellexpand::tilde(path).to_string());
        if !paths.contains(&expanded) {
            paths.push(expanded);
        }
    }

    paths
}

/// Resolves the frecency store path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// path. Shell expansions like `~` are resolved.
#[must_use]
pub fn get_frecency_path(frecency_path_arg: &Option<String>) -> String {
    let frecency_path = match frecency_path_arg {
        Some(frecency_path) => frecency_path,
        None => DEFAULT_FRECENCY_PATH,
    };

    shellexpand::tilde(frecency_path).to_string()
}

/// Picks the shell that runs committed commands.
///
/// Order: explicit argument, `$SHELL`, then [`DEFAULT_SHELL`].
#[must_use]
pub fn get_shell(shell_arg: &Option<String>) -> String {
    if let Some(shell) = shell_arg {
        return shellexpand::tilde(shell).to_string();
    }

    env::var("SHELL")
        .ok()
        .filter(|shell| !shell.is_empty())
        .unwrap_or_else(|| DEFAULT_SHELL.to_string())
}
