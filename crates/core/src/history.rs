//! Shell history loading.
//!
//! Reads bash, zsh and fish history files into a flat list of
//! [`HistoryEntry`] values: one entry per distinct command, annotated with how
//! often it occurs and when it was last used.

use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::frecency::FrecencyStore;

/// Byte zsh uses to escape ("metafy") special bytes in its history file.
const ZSH_META: u8 = 0x83;

/// A single distinct command from the user's history.
///
/// `last_used` is a Unix timestamp when the history file records one.
/// Files without timestamps fall back to the command's line ordinal, which
/// still orders entries by recency within that file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub text: String,
    pub last_used: u64,
    pub frequency: u32,
}

impl HistoryEntry {
    pub fn new(text: impl Into<String>, last_used: u64, frequency: u32) -> Self {
        Self {
            text: text.into(),
            last_used,
            frequency: frequency.max(1),
        }
    }
}

impl Display for HistoryEntry {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.text)
    }
}

/// Read-only candidate set shared between the session and the rank worker.
pub type Candidates = Arc<[Arc<HistoryEntry>]>;

/// The on-disk layout of a history file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFormat {
    /// One command per line, optionally preceded by `#<epoch>` lines.
    Bash,
    /// `: <epoch>:<duration>;<command>` lines, or plain lines.
    Zsh,
    /// YAML-like `- cmd:` entries with `when:` timestamps.
    Fish,
}

impl HistoryFormat {
    /// Guesses the format from the file name, then from the first line of
    /// `contents` for files named like neither zsh nor fish history.
    #[must_use]
    pub fn detect(path: &Path, contents: &[u8]) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if file_name.contains("zsh") || file_name.contains("zhistory") {
            return HistoryFormat::Zsh;
        }
        if file_name.contains("fish") {
            return HistoryFormat::Fish;
        }

        let first_line = contents
            .split(|byte| *byte == b'\n')
            .map(String::from_utf8_lossy)
            .find(|line| !line.trim().is_empty())
            .unwrap_or_default();

        if parse_zsh_extended(&first_line).is_some() {
            HistoryFormat::Zsh
        } else if first_line.starts_with("- cmd:") {
            HistoryFormat::Fish
        } else {
            HistoryFormat::Bash
        }
    }
}

/// One raw line (or logical record) read from a history file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub text: String,
    pub timestamp: Option<u64>,
}

impl HistoryRecord {
    fn new(text: &str, timestamp: Option<u64>) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            text: text.to_string(),
            timestamp,
        })
    }
}

/// Parses the contents of a history file in the given format.
#[must_use]
pub fn parse_history(contents: &str, format: HistoryFormat) -> Vec<HistoryRecord> {
    match format {
        HistoryFormat::Bash => parse_bash(contents),
        HistoryFormat::Zsh => parse_zsh(contents),
        HistoryFormat::Fish => parse_fish(contents),
    }
}

fn parse_bash(contents: &str) -> Vec<HistoryRecord> {
    let mut records = Vec::new();
    let mut pending_timestamp = None;

    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(stamp) = line.strip_prefix('#') {
            if let Ok(timestamp) = stamp.trim().parse::<u64>() {
                pending_timestamp = Some(timestamp);
                continue;
            }
        }

        if let Some(record) = HistoryRecord::new(line, pending_timestamp.take()) {
            records.push(record);
        }
    }

    records
}

fn parse_zsh_extended(line: &str) -> Option<(u64, &str)> {
    let rest = line.strip_prefix(':')?;
    let (header, command) = rest.split_once(';')?;
    let (timestamp, _duration) = header.trim().split_once(':')?;
    Some((timestamp.trim().parse().ok()?, command))
}

fn parse_zsh(contents: &str) -> Vec<HistoryRecord> {
    let mut records = Vec::new();
    let mut continued: Option<(String, Option<u64>)> = None;

    for line in contents.lines() {
        let (text, timestamp) = match continued.take() {
            Some((mut text, timestamp)) => {
                text.push('\n');
                text.push_str(line);
                (text, timestamp)
            }
            None => match parse_zsh_extended(line) {
                Some((timestamp, command)) => (command.to_string(), Some(timestamp)),
                None => (line.to_string(), None),
            },
        };

        // A trailing backslash continues the command on the next line
        if let Some(stripped) = text.strip_suffix('\\') {
            continued = Some((stripped.to_string(), timestamp));
            continue;
        }

        if let Some(record) = HistoryRecord::new(&text, timestamp) {
            records.push(record);
        }
    }

    if let Some((text, timestamp)) = continued {
        records.extend(HistoryRecord::new(&text, timestamp));
    }

    records
}

fn unescape_fish(command: &str) -> String {
    let mut unescaped = String::with_capacity(command.len());
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('\\') => unescaped.push('\\'),
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }

    unescaped
}

fn parse_fish(contents: &str) -> Vec<HistoryRecord> {
    let mut records: Vec<HistoryRecord> = Vec::new();

    for line in contents.lines() {
        let line = line.trim();

        if let Some(command) = line.strip_prefix("- cmd:") {
            records.extend(HistoryRecord::new(&unescape_fish(command), None));
        } else if let Some(when) = line.strip_prefix("when:") {
            if let (Some(last), Ok(timestamp)) = (records.last_mut(), when.trim().parse()) {
                last.timestamp = Some(timestamp);
            }
        }
    }

    records
}

/// Reverses zsh's metafication of bytes that would otherwise be special.
fn unmetafy(bytes: &[u8]) -> Vec<u8> {
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter();

    while let Some(&byte) = iter.next() {
        if byte == ZSH_META {
            if let Some(&next) = iter.next() {
                decoded.push(next ^ 0x20);
            }
        } else {
            decoded.push(byte);
        }
    }

    decoded
}

/// Reads and parses a single history file.
///
/// # Errors
///
/// Returns an error if the file cannot be read. Invalid UTF-8 is replaced
/// rather than rejected.
pub fn read_history_file(path: &Path) -> Result<Vec<HistoryRecord>> {
    let bytes = fs::read(path).map_err(|e| {
        Error::io_error(
            "history".to_string(),
            path.display().to_string(),
            e,
        )
    })?;
    let format = HistoryFormat::detect(path, &bytes);

    let bytes = if format == HistoryFormat::Zsh {
        unmetafy(&bytes)
    } else {
        bytes
    };

    let records = parse_history(&String::from_utf8_lossy(&bytes), format);
    debug!(
        "Read {} records from `{}` as {:?}",
        records.len(),
        path.display(),
        format
    );
    Ok(records)
}

/// Collapses raw records into distinct entries, most recent first.
///
/// Records without a timestamp inherit the closest preceding one, or their
/// ordinal position when the file has no timestamps at all.
#[must_use]
pub fn build_entries(records: &[HistoryRecord]) -> Vec<HistoryEntry> {
    let mut previous_timestamp = None;
    let stamped: Vec<(&str, u64)> = records
        .iter()
        .enumerate()
        .map(|(ordinal, record)| {
            if record.timestamp.is_some() {
                previous_timestamp = record.timestamp;
            }
            let last_used = previous_timestamp.unwrap_or(ordinal as u64);
            (record.text.as_str(), last_used)
        })
        .collect();

    let mut deduplicated: IndexMap<&str, HistoryEntry> = IndexMap::new();
    for &(text, last_used) in stamped.iter().rev() {
        deduplicated
            .entry(text)
            .and_modify(|entry| {
                entry.frequency += 1;
                entry.last_used = entry.last_used.max(last_used);
            })
            .or_insert_with(|| HistoryEntry::new(text, last_used, 1));
    }

    deduplicated.into_values().collect()
}

/// The loaded, immutable set of history entries for one session.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    #[must_use]
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    /// Loads every readable history file, skipping the ones that fail.
    ///
    /// Files are concatenated in the order given before deduplication.
    #[must_use]
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Self {
        let mut records = Vec::new();

        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                debug!("History file `{}` does not exist, skipping", path.display());
                continue;
            }

            match read_history_file(path) {
                Ok(file_records) => records.extend(file_records),
                Err(e) => warn!("Skipping unreadable history file: {e}"),
            }
        }

        let entries = build_entries(&records);
        info!(
            "Loaded {} distinct commands from {} history records",
            entries.len(),
            records.len()
        );

        Self { entries }
    }

    /// Folds usage recorded by this tool into the loaded entries.
    ///
    /// Commands that only exist in the frecency store are appended.
    pub fn apply_frecency(&mut self, frecency: &FrecencyStore) {
        let mut by_text: IndexMap<String, HistoryEntry> = self
            .entries
            .drain(..)
            .map(|entry| (entry.text.clone(), entry))
            .collect();

        for (text, usage) in frecency.iter() {
            by_text
                .entry(text.to_string())
                .and_modify(|entry| {
                    entry.frequency = entry.frequency.saturating_add(usage.count);
                    entry.last_used = entry.last_used.max(usage.last_used);
                })
                .or_insert_with(|| HistoryEntry::new(text, usage.last_used, usage.count));
        }

        self.entries = by_text.into_values().collect();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Snapshot of the entries as a shareable candidate set.
    #[must_use]
    pub fn candidates(&self) -> Candidates {
        self.entries.iter().cloned().map(Arc::new).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_format_from_file_name() {
        assert_eq!(
            HistoryFormat::detect(&PathBuf::from("/home/u/.zsh_history"), b"ls\n"),
            HistoryFormat::Zsh
        );
        assert_eq!(
            HistoryFormat::detect(&PathBuf::from("/home/u/.local/share/fish/fish_history"), b""),
            HistoryFormat::Fish
        );
        assert_eq!(
            HistoryFormat::detect(&PathBuf::from("/home/u/.bash_history"), b"ls\n"),
            HistoryFormat::Bash
        );
        assert_eq!(
            HistoryFormat::detect(&PathBuf::from("/tmp/whatever"), b""),
            HistoryFormat::Bash
        );
    }

    #[test]
    fn test_detect_format_from_contents() {
        let histfile = PathBuf::from("/home/u/.histfile");
        assert_eq!(
            HistoryFormat::detect(&histfile, b"\n: 1700000000:0;git status\n"),
            HistoryFormat::Zsh
        );
        assert_eq!(
            HistoryFormat::detect(&histfile, b"- cmd: ls\n  when: 1700000000\n"),
            HistoryFormat::Fish
        );
        assert_eq!(
            HistoryFormat::detect(&histfile, b"#1700000000\ngit status\n"),
            HistoryFormat::Bash
        );
    }

    #[test]
    fn test_parse_bash_with_timestamps() {
        let contents = "#1700000000\nls -la\ncd /tmp\n\n#1700000100\ngit status\n";
        let records = parse_history(contents, HistoryFormat::Bash);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0], HistoryRecord::new("ls -la", Some(1_700_000_000)).unwrap());
        assert_eq!(records[1].timestamp, None);
        assert_eq!(records[2].timestamp, Some(1_700_000_100));
    }

    #[test]
    fn test_parse_bash_comment_is_a_command() {
        let records = parse_history("# not a timestamp\n", HistoryFormat::Bash);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "# not a timestamp");
    }

    #[test]
    fn test_parse_zsh_extended_and_plain() {
        let contents = ": 1234567890:0;ls -la\n: 1234567891:0;cd /tmp\nvim config.txt\n";
        let records = parse_history(contents, HistoryFormat::Zsh);

        let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["ls -la", "cd /tmp", "vim config.txt"]);
        assert_eq!(records[0].timestamp, Some(1_234_567_890));
        assert_eq!(records[2].timestamp, None);
    }

    #[test]
    fn test_parse_zsh_multiline_command() {
        let contents = ": 1:0;echo one \\\ntwo\n: 2:0;pwd\n";
        let records = parse_history(contents, HistoryFormat::Zsh);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "echo one \ntwo");
        assert_eq!(records[0].timestamp, Some(1));
    }

    #[test]
    fn test_parse_fish() {
        let contents = "- cmd: git status\n  when: 1700000000\n- cmd: echo a\\nb\n  when: 1700000005\n  paths:\n    - a\n";
        let records = parse_history(contents, HistoryFormat::Fish);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "git status");
        assert_eq!(records[0].timestamp, Some(1_700_000_000));
        assert_eq!(records[1].text, "echo a\nb");
    }

    #[test]
    fn test_unmetafy() {
        assert_eq!(unmetafy(&[b'a', ZSH_META, 0xa3, b'b']), vec![b'a', 0x83, b'b']);
    }

    #[test]
    fn test_build_entries_deduplicates_and_counts() {
        let records = parse_history(
            "ls -la\ncd /home/user\ngit status\nls -la\ngrep x file.txt\n",
            HistoryFormat::Bash,
        );
        let entries = build_entries(&records);

        let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["grep x file.txt", "ls -la", "git status", "cd /home/user"]);

        let ls = entries.iter().find(|e| e.text == "ls -la").unwrap();
        assert_eq!(ls.frequency, 2);
        assert_eq!(ls.last_used, 3);
    }

    #[test]
    fn test_build_entries_inherits_timestamps() {
        let records = vec![
            HistoryRecord::new("a", Some(100)).unwrap(),
            HistoryRecord::new("b", None).unwrap(),
        ];
        let entries = build_entries(&records);
        assert!(entries.iter().all(|e| e.last_used == 100));
    }

    #[test]
    fn test_entry_frequency_is_at_least_one() {
        assert_eq!(HistoryEntry::new("ls", 0, 0).frequency, 1);
    }
}
