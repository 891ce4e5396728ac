//! Termination signal flags.
//!
//! Signals are never handled inside the handler itself. They only set a flag
//! which the selection loop checks between polls, so the terminal guard is
//! always dropped on the normal path and the terminal is restored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hist_core::error::Result;
use log::debug;

#[derive(Debug, Clone, Default)]
pub struct TerminationFlags {
    interrupt: Arc<AtomicBool>,
    terminate: Arc<AtomicBool>,
}

impl TerminationFlags {
    /// Registers SIGINT, SIGTERM and SIGHUP.
    ///
    /// While a chosen command runs, SIGINT reaches the child through the
    /// terminal's foreground process group; here it is only recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if a handler cannot be registered.
    pub fn register() -> Result<Self> {
        let flags = Self::default();

        #[cfg(unix)]
        {
            use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
            use signal_hook::flag;

            flag::register(SIGINT, Arc::clone(&flags.interrupt))?;
            flag::register(SIGTERM, Arc::clone(&flags.terminate))?;
            flag::register(SIGHUP, Arc::clone(&flags.terminate))?;
        }

        Ok(flags)
    }

    /// Whether the process was asked to exit.
    #[must_use]
    pub fn terminated(&self) -> bool {
        self.terminate.load(Ordering::Relaxed)
    }

    /// Whether the selection loop should stop: termination, or an interrupt
    /// delivered while the loop was running.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.terminated() || self.interrupt.load(Ordering::Relaxed)
    }

    /// Forgets an interrupt that was meant for a command that has exited.
    pub fn clear_interrupt(&self) {
        if self.interrupt.swap(false, Ordering::Relaxed) {
            debug!("Cleared interrupt received while a command was running");
        }
    }

    #[cfg(test)]
    fn raise(&self, terminate: bool) {
        let flag = if terminate {
            &self.terminate
        } else {
            &self.interrupt
        };
        flag.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_is_cleared_after_command() {
        let flags = TerminationFlags::default();
        assert!(!flags.should_stop());

        flags.raise(false);
        assert!(flags.should_stop());
        assert!(!flags.terminated());

        flags.clear_interrupt();
        assert!(!flags.should_stop());
    }

    #[test]
    fn test_termination_is_not_cleared() {
        let flags = TerminationFlags::default();
        flags.raise(true);
        flags.clear_interrupt();
        assert!(flags.terminated());
        assert!(flags.should_stop());
    }

    #[cfg(unix)]
    #[test]
    fn test_register() {
        assert!(TerminationFlags::register().is_ok());
    }
}
