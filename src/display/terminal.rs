//! # Crossterm Terminal Grid
//!
//! [`Grid`] implementation over the process terminal using `crossterm`.
//!
//! Opening the grid switches the terminal to raw mode on the alternate
//! screen; dropping it restores the cursor, the main screen and cooked mode.
//! In raw mode Ctrl+C no longer raises SIGINT and arrives as keycode 3.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use tracing::{debug, warn};

use super::grid::{Grid, Keycode};

/// ASCII BEL, rung by [`Grid::flash`]
const BELL: char = '\x07';

/// Terminal grid backed by stdout
pub struct CrosstermGrid {
    out: Stdout,
}

impl std::fmt::Debug for CrosstermGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrosstermGrid").finish_non_exhaustive()
    }
}

impl CrosstermGrid {
    /// Take over the terminal
    ///
    /// # Errors
    ///
    /// Returns error if raw mode or the alternate screen cannot be entered
    /// (e.g. stdout is not a terminal).
    pub fn open() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut out = io::stdout();
        if let Err(e) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        debug!("Terminal switched to raw mode");
        Ok(Self { out })
    }
}

impl Drop for CrosstermGrid {
    fn drop(&mut self) {
        if let Err(e) = execute!(self.out, Show, LeaveAlternateScreen) {
            warn!("Failed to restore terminal screen: {}", e);
        }
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to leave raw mode: {}", e);
        }
    }
}

impl Grid for CrosstermGrid {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn poll_key(&mut self) -> io::Result<Option<Keycode>> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                if let Some(code) = keycode(key.code, key.modifiers) {
                    return Ok(Some(code));
                }
            }
        }
        Ok(None)
    }

    fn clear(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All))
    }

    fn put_str(&mut self, row: u16, col: u16, text: &str) -> io::Result<()> {
        queue!(self.out, MoveTo(col, row), Print(text))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn flash(&mut self) -> io::Result<()> {
        queue!(self.out, Print(BELL))
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        if visible {
            execute!(self.out, Show)
        } else {
            execute!(self.out, Hide)
        }
    }
}

/// Translate a crossterm key into a character code
///
/// Keys without a character code (arrows, function keys) map to `None`.
pub fn keycode(code: KeyCode, modifiers: KeyModifiers) -> Option<Keycode> {
    match code {
        KeyCode::Char(c) if modifiers.contains(KeyModifiers::CONTROL) && c.is_ascii_alphabetic() => {
            Some(u32::from(c.to_ascii_lowercase()) & 0x1f)
        }
        KeyCode::Char(c) => Some(u32::from(c)),
        KeyCode::Enter => Some(10),
        KeyCode::Tab => Some(9),
        KeyCode::Backspace => Some(127),
        KeyCode::Esc => Some(27),
        _ => None,
    }
}
