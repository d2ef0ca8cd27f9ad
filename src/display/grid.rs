//! Trait abstraction for character-grid terminals to enable testing

use std::io;

/// Integer code of a single keystroke (a Unicode scalar value or an ASCII
/// control code).
pub type Keycode = u32;

/// Character-addressable terminal grid
///
/// Implemented by [`super::terminal::CrosstermGrid`] for the real terminal
/// and by in-memory grids in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Grid {
    /// Current grid size as `(width, height)` in cells
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Next pending keystroke, without blocking
    fn poll_key(&mut self) -> io::Result<Option<Keycode>>;

    /// Erase the whole grid
    fn clear(&mut self) -> io::Result<()>;

    /// Write `text` starting at `(row, col)`, overwriting existing cells
    fn put_str(&mut self, row: u16, col: u16, text: &str) -> io::Result<()>;

    /// Make pending writes visible
    fn flush(&mut self) -> io::Result<()>;

    /// Visible or audible alert
    fn flash(&mut self) -> io::Result<()>;

    /// Show or hide the hardware cursor
    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()>;
}
