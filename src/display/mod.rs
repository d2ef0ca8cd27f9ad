//! # Display Module
//!
//! Line-oriented text window over a character grid.
//!
//! This module handles:
//! - Non-blocking single-key polling
//! - Dividing the grid height into a fixed number of logical lines
//! - Overwriting stale characters from the previous render
//! - Flash/alert
//!
//! It has no knowledge of button semantics.

pub mod grid;
pub mod terminal;

use tracing::trace;

use crate::error::{FakeJoyError, Result};
use grid::{Grid, Keycode};

/// Default left margin in cells
pub const DEFAULT_MARGIN: u16 = 10;

/// Fixed-height text window
///
/// # Examples
///
/// ```no_run
/// use fake_joy::display::TextWindow;
/// use fake_joy::display::terminal::CrosstermGrid;
///
/// let mut window = TextWindow::new(CrosstermGrid::open()?, 10, 10)?;
/// window.clear()?;
/// window.write_line(3, "hello")?;
/// window.refresh()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct TextWindow<G: Grid> {
    grid: G,
    num_lines: usize,
    margin: u16,
}

impl<G: Grid> TextWindow<G> {
    /// Wrap a grid, hiding its cursor
    ///
    /// # Errors
    ///
    /// Returns `InvalidModel` if `num_lines` is zero, or an I/O error if the
    /// cursor cannot be hidden.
    pub fn new(mut grid: G, num_lines: usize, margin: u16) -> Result<Self> {
        if num_lines == 0 {
            return Err(FakeJoyError::InvalidModel(
                "text window needs at least one line".to_string(),
            ));
        }
        grid.set_cursor_visible(false)?;
        Ok(Self {
            grid,
            num_lines,
            margin,
        })
    }

    /// Number of logical lines
    pub fn num_lines(&self) -> usize {
        self.num_lines
    }

    /// Next buffered keystroke, or `None` when nothing is pending
    pub fn read_key(&mut self) -> Result<Option<Keycode>> {
        Ok(self.grid.poll_key()?)
    }

    /// Erase all rendered content
    pub fn clear(&mut self) -> Result<()> {
        Ok(self.grid.clear()?)
    }

    /// Write `message` on logical line `index`
    ///
    /// The screen row is `height * index / num_lines`. Every physical line
    /// of `message` is padded with spaces to the grid width so that stale
    /// characters are overwritten; rows below the grid are dropped.
    ///
    /// # Errors
    ///
    /// Returns `LineOutOfRange` if `index >= num_lines`.
    pub fn write_line(&mut self, index: usize, message: &str) -> Result<()> {
        if index >= self.num_lines {
            return Err(FakeJoyError::LineOutOfRange {
                index,
                lines: self.num_lines,
            });
        }

        let (width, height) = self.grid.size()?;
        let avail = usize::from(width.saturating_sub(self.margin));
        if avail == 0 {
            return Ok(());
        }

        let first_row = usize::from(height) * index / self.num_lines;
        for (offset, text) in message.split('\n').enumerate() {
            let row = first_row + offset;
            if row >= usize::from(height) {
                trace!("Clipped line {} at row {}", index, row);
                break;
            }
            let padded: String = text
                .chars()
                .chain(std::iter::repeat(' '))
                .take(avail)
                .collect();
            // row < height <= u16::MAX
            self.grid.put_str(row as u16, self.margin, &padded)?;
        }
        Ok(())
    }

    /// Flush pending writes to the visible grid
    pub fn refresh(&mut self) -> Result<()> {
        Ok(self.grid.flush()?)
    }

    /// Flash the grid
    pub fn beep(&mut self) -> Result<()> {
        Ok(self.grid.flash()?)
    }

    /// Borrow the underlying grid
    pub fn grid(&self) -> &G {
        &self.grid
    }
}
