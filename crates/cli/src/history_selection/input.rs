use std::io::{BufRead, Write};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use hist_core::error::Result;
use hist_core::session::SessionEvent;
use log::debug;

use super::types::{Action, RunChoice};

/// Maps a terminal event to the action it triggers.
///
/// Returns `None` for input the selection loop does not handle. Key release
/// events are ignored so that terminals reporting them do not double every
/// keystroke.
#[must_use]
pub fn map_event(event: &Event) -> Option<Action> {
    match event {
        Event::Key(key_event) => map_key_event(key_event),
        Event::Resize(width, height) => Some(Action::TerminalResized {
            width: *width,
            height: *height,
        }),
        _ => {
            debug!("Ignoring unsupported input {event:?}");
            None
        }
    }
}

fn map_key_event(key_event: &KeyEvent) -> Option<Action> {
    if key_event.kind == KeyEventKind::Release {
        return None;
    }

    let session = |event| Some(Action::Session(event));

    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return match key_event.code {
            KeyCode::Char('c' | 'g') => session(SessionEvent::Cancel),
            KeyCode::Char('p') => session(SessionEvent::MoveUp),
            KeyCode::Char('n') => session(SessionEvent::MoveDown),
            KeyCode::Char('u') => session(SessionEvent::ClearQuery),
            KeyCode::Char('r') => Some(Action::Reload),
            _ => {
                debug!("Ignoring unbound key {key_event:?}");
                None
            }
        };
    }

    match key_event.code {
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::ALT) => {
            session(SessionEvent::Insert(c))
        }
        KeyCode::Backspace => session(SessionEvent::Backspace),
        KeyCode::Up => session(SessionEvent::MoveUp),
        KeyCode::Down => session(SessionEvent::MoveDown),
        KeyCode::Enter => session(SessionEvent::Commit),
        KeyCode::Esc => session(SessionEvent::Cancel),
        _ => {
            debug!("Ignoring unbound key {key_event:?}");
            None
        }
    }
}

/// Confirms with the user whether `command` should be run.
///
/// An empty answer means yes. End of input means no.
///
/// # Errors
///
/// Returns an error if reading the answer or writing the prompt fails.
pub fn confirm_command_should_run<R: BufRead, W: Write>(
    command: &str,
    input: &mut R,
    output: &mut W,
) -> Result<RunChoice> {
    loop {
        write!(output, "Run `{command}`? ([Y]es/[n]o): ")?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            writeln!(output)?;
            return Ok(RunChoice::No);
        }

        match answer.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => return Ok(RunChoice::Yes),
            "n" | "no" => return Ok(RunChoice::No),
            _ => {}
        }
    }
}

/// Records in scroll-back which command the following output belongs to.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_executing_command<W: Write>(command: &str, output: &mut W) -> Result<()> {
    writeln!(output, "Executing: {command}")?;
    output.flush()?;
    Ok(())
}
