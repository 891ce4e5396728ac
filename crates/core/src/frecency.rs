//! Usage store for commands run through `hist`.
//!
//! The store is read once when the tool starts and written once when it
//! exits. Its counts are folded into the shell history so that commands
//! picked often from `hist` rank ahead of ones that merely appear in history.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How often and how recently a command was run.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    pub count: u32,
    pub last_used: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FrecencyStore {
    #[serde(default)]
    commands: BTreeMap<String, Usage>,
}

/// Seconds since the Unix epoch, or zero if the clock is before it.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

impl FrecencyStore {
    /// Reads the store from disk.
    ///
    /// A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a
    /// valid store.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            debug!("No frecency store at `{path}`, starting empty");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| Error::io_error("frecency".to_string(), path.to_string(), e))?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let store: serde_yaml::Result<FrecencyStore> = serde_yaml::from_str(&contents);

        match store {
            Ok(store) => Ok(store),
            Err(e) => Err(Error::yaml_error(
                "reading".to_string(),
                "frecency".to_string(),
                path.to_string(),
                e,
            )),
        }
    }

    /// Writes the store to disk, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or serialized.
    pub fn save(&self, path: &str) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::io_error("frecency".to_string(), parent.display().to_string(), e)
                })?;
            }
        }

        let writer = File::create(path)
            .map_err(|e| Error::io_error("frecency".to_string(), path.to_string(), e))?;

        serde_yaml::to_writer(writer, self).map_err(|e| {
            Error::yaml_error(
                "writing".to_string(),
                "frecency".to_string(),
                path.to_string(),
                e,
            )
        })
    }

    /// Records one run of `command` at time `now`.
    pub fn record(&mut self, command: &str, now: u64) {
        let usage = self.commands.entry(command.to_string()).or_default();
        usage.count = usage.count.saturating_add(1);
        usage.last_used = usage.last_used.max(now);
    }

    #[must_use]
    pub fn get(&self, command: &str) -> Option<&Usage> {
        self.commands.get(command)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Usage)> {
        self.commands.iter().map(|(text, usage)| (text.as_str(), usage))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
