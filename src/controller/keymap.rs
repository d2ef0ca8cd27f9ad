//! # Key Binding Module
//!
//! Static lookup table from keystroke codes to gamepad buttons.
//!
//! ## Default Bindings
//!
//! | Key | Button |
//! |-----|--------|
//! | `j` | X |
//! | `i` | Y |
//! | `m` | A |
//! | `k` | B |
//! | `u` | Left bumper |
//! | `o` | Right bumper |
//! | `a` | Back |
//! | `s` | Logitech |
//! | `d` | Start |
//! | `e` | Left stick click |
//! | `r` | Right stick click |
//!
//! `q` (and Ctrl+C, keycode 3) quits and is never a binding.

use std::collections::BTreeMap;

use super::buttons::Button;
use crate::display::grid::Keycode;
use crate::error::{FakeJoyError, Result};

/// Key that stops the teleop loop
pub const SHUTDOWN_KEY: char = 'q';

/// Ctrl+C as delivered by a terminal in raw mode
pub const INTERRUPT_KEYCODE: Keycode = 3;

/// Default key layout
const DEFAULT_BINDINGS: [(char, Button); 11] = [
    ('j', Button::X),
    ('i', Button::Y),
    ('m', Button::A),
    ('k', Button::B),
    ('u', Button::LeftBumper),
    ('o', Button::RightBumper),
    ('a', Button::Back),
    ('s', Button::Logitech),
    ('d', Button::Start),
    ('e', Button::LeftJoystick),
    ('r', Button::RightJoystick),
];

/// Whether `key` requests shutdown
pub fn is_shutdown_key(key: Keycode) -> bool {
    key == u32::from(SHUTDOWN_KEY) || key == INTERRUPT_KEYCODE
}

/// Immutable key → button table
///
/// # Examples
///
/// ```
/// use fake_joy::controller::buttons::Button;
/// use fake_joy::controller::keymap::KeyBinding;
///
/// let bindings = KeyBinding::default();
/// assert_eq!(bindings.button_for(u32::from('j')), Some(Button::X));
/// assert_eq!(bindings.button_for(u32::from('z')), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    table: BTreeMap<Keycode, Button>,
}

impl KeyBinding {
    /// Build a table from `(key, button)` pairs
    ///
    /// # Errors
    ///
    /// Returns `InvalidModel` if a key is bound twice or a shutdown key is
    /// bound.
    pub fn new<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (char, Button)>,
    {
        let mut table = BTreeMap::new();
        for (key, button) in pairs {
            let code = u32::from(key);
            if is_shutdown_key(code) {
                return Err(FakeJoyError::InvalidModel(format!(
                    "'{}' is reserved for shutdown",
                    key.escape_default()
                )));
            }
            if let Some(previous) = table.insert(code, button) {
                return Err(FakeJoyError::InvalidModel(format!(
                    "'{}' bound to both {} and {}",
                    key.escape_default(),
                    previous,
                    button
                )));
            }
        }
        Ok(Self { table })
    }

    /// Button bound to `key`, if any
    pub fn button_for(&self, key: Keycode) -> Option<Button> {
        self.table.get(&key).copied()
    }

    /// Number of bound keys
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no key is bound
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Bound `(key, button)` pairs ordered by keycode
    pub fn iter(&self) -> impl Iterator<Item = (Keycode, Button)> + '_ {
        self.table.iter().map(|(&key, &button)| (key, button))
    }

    /// Key legend, one `key=BUTTON` entry per binding, wrapped to
    /// `per_line` entries per line
    pub fn legend(&self, per_line: usize) -> String {
        let entries: Vec<String> = self
            .iter()
            .map(|(key, button)| {
                let key = char::from_u32(key).unwrap_or(char::REPLACEMENT_CHARACTER);
                format!("{}={}", key, button)
            })
            .collect();
        entries
            .chunks(per_line.max(1))
            .map(|chunk| chunk.join("  "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for KeyBinding {
    fn default() -> Self {
        Self {
            table: DEFAULT_BINDINGS
                .iter()
                .map(|&(key, button)| (u32::from(key), button))
                .collect(),
        }
    }
}
