//! The inline region the selection loop draws into.
//!
//! Instead of switching to the alternate screen, the region is reserved
//! below the cursor by printing newlines, which scrolls earlier output into
//! scroll-back when the cursor is near the bottom. All drawing stays inside
//! the region. Dropping the region clears it, puts the cursor back where it
//! was, shows it again and leaves raw mode.

use std::io::{stdout, Write};
use std::sync::Once;

use crossterm::cursor::{self, MoveTo, MoveUp};
use crossterm::style::Print;
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType};
use crossterm::{execute, queue};
use hist_core::error::{Error, Result};
use log::{debug, warn};

static PANIC_HOOK: Once = Once::new();

/// Restores the terminal before the default panic output is printed.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(stdout(), cursor::Show);
            previous_hook(info);
        }));
    });
}

/// Rows needed for the search bar and at least one result.
const MIN_FULL_ROWS: u16 = 2;

/// Number of rows the region actually gets on a terminal `height` rows tall.
///
/// A region taller than the terminal shrinks to the terminal's height. Only
/// a terminal with no room for a result row leaves a single row.
#[must_use]
pub fn rows_for(requested: u16, height: u16) -> u16 {
    requested.min(height).max(1)
}

/// The reserved rows at the bottom of the visible screen.
///
/// The last row is the search bar; the rows above it hold results.
pub struct InlineRegion {
    top: u16,
    rows: u16,
    width: u16,
    /// Where the cursor was before the region was reserved
    anchor: (u16, u16),
    degraded: bool,
    /// Whether dropping the region has a terminal to restore
    active: bool,
}

impl InlineRegion {
    /// Enters raw mode and reserves `requested_rows` rows below the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TerminalSetup`] if raw mode cannot be entered, or an
    /// I/O error if the cursor cannot be queried or moved.
    pub fn reserve(requested_rows: u16) -> Result<Self> {
        let (width, height) = terminal::size().map_err(Error::terminal_setup)?;
        enable_raw_mode().map_err(Error::terminal_setup)?;
        install_panic_hook();

        let rows = rows_for(requested_rows, height);
        let mut region = Self {
            top: 0,
            rows,
            width,
            anchor: (0, 0),
            degraded: rows < MIN_FULL_ROWS,
            active: true,
        };

        // From here on a failure drops the region, which restores the terminal
        let (column, row) = cursor::position()?;
        let start_on_next_line = column > 0;

        let mut stdout = stdout();
        queue!(stdout, cursor::Hide)?;
        let newlines = region.rows - 1 + u16::from(start_on_next_line);
        for _ in 0..newlines {
            queue!(stdout, Print("\r\n"))?;
        }
        stdout.flush()?;

        let (_, bottom) = cursor::position()?;
        region.top = bottom.saturating_sub(region.rows - 1);
        // Scrolling moved the original cursor row up by however many rows
        // the newlines pushed into scroll-back
        let scrolled = (row + newlines).saturating_sub(bottom);
        region.anchor = (column, row.saturating_sub(scrolled));

        debug!(
            "Reserved {} rows at row {} (requested {requested_rows}, terminal {width}x{height})",
            region.rows, region.top
        );

        if region.rows > 1 {
            queue!(stdout, MoveUp(region.rows - 1))?;
        }
        stdout.flush()?;

        Ok(region)
    }

    /// Rows available for results above the search bar. Zero when degraded.
    #[must_use]
    pub fn result_rows(&self) -> usize {
        if self.degraded {
            0
        } else {
            usize::from(self.rows - 1)
        }
    }

    #[must_use]
    pub fn top(&self) -> u16 {
        self.top
    }

    /// Screen row of the search bar.
    #[must_use]
    pub fn bar_row(&self) -> u16 {
        self.top + self.rows - 1
    }

    #[must_use]
    pub fn width(&self) -> usize {
        usize::from(self.width)
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Draws only the single-line form from now on.
    pub fn degrade(&mut self) {
        if !self.degraded {
            warn!("Falling back to single-line display");
            self.degraded = true;
        }
    }

    /// Adapts to a resized terminal.
    ///
    /// The region never grows past what was reserved. If the terminal became
    /// too short for it, the region shrinks to fill the terminal, or to the
    /// single-line form on its bottom row for the rest of the session when
    /// no result row fits. Returns the rows now available for results.
    pub fn resize(&mut self, width: u16, height: u16) -> usize {
        self.width = width;
        let last_row = height.max(1) - 1;

        if height < MIN_FULL_ROWS.min(self.rows) || (self.is_degraded() && height < self.rows) {
            self.degrade();
            self.top = self.bar_row().min(last_row);
            self.rows = 1;
        } else if height < self.rows {
            debug!("Shrinking region from {} to {height} rows", self.rows);
            self.top = 0;
            self.rows = height;
        } else if self.bar_row() > last_row {
            self.top = last_row + 1 - self.rows;
        }

        self.result_rows()
    }

    /// Clears every row of the region.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn clear<W: Write>(&self, out: &mut W) -> Result<()> {
        queue!(out, MoveTo(0, self.top), Clear(ClearType::FromCursorDown))?;
        Ok(())
    }
}

impl Drop for InlineRegion {
    fn drop(&mut self) {
        if !self.active {
            return;
        }

        let mut stdout = stdout();
        let _ = self.clear(&mut stdout);
        let _ = queue!(stdout, MoveTo(self.anchor.0, self.anchor.1), cursor::Show);
        let _ = stdout.flush();
        let _ = disable_raw_mode();
    }
}
