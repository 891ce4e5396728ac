use std::process::{Command, Stdio};

use log::info;

use crate::error::{Error, Result};

/// Exit status of a command run by an [`Executor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// `None` when the child was killed by a signal.
    pub code: Option<i32>,
}

impl ExitOutcome {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a committed command string.
///
/// The string is opaque: implementations decide how it is quoted and which
/// context it runs in.
pub trait Executor {
    /// # Errors
    ///
    /// Returns an error if the command could not be started at all. A command
    /// that runs and fails is reported through [`ExitOutcome`].
    fn execute(&mut self, command: &str) -> Result<ExitOutcome>;
}

/// Hands the command to `<shell> -c`, inheriting the terminal.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl ShellExecutor {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    #[must_use]
    pub fn shell(&self) -> &str {
        &self.shell
    }
}

impl Executor for ShellExecutor {
    fn execute(&mut self, command: &str) -> Result<ExitOutcome> {
        info!("Executing `{command}` with `{}`", self.shell);

        let status = Command::new(&self.shell)
            .args(["-c", command])
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|original| Error::SubProcess {
                shell: self.shell.clone(),
                command: command.to_string(),
                original,
            })?;

        Ok(ExitOutcome {
            code: status.code(),
        })
    }
}
