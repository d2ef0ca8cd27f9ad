//! # Button Model Module
//!
//! Digital buttons of the emulated gamepad and their per-cycle state.
//!
//! ## Logitech F710 Layout
//!
//! | Index | Button | Name |
//! |-------|--------|------|
//! | 0 | A | `A_BUTTON` |
//! | 1 | B | `B_BUTTON` |
//! | 2 | X | `X_BUTTON` |
//! | 3 | Y | `Y_BUTTON` |
//! | 4 | LB | `LEFT_BUMPER` |
//! | 5 | RB | `RIGHT_BUMPER` |
//! | 6 | Back | `BACK` |
//! | 7 | Start | `START` |
//! | 8 | Logitech | `LOGITECH` |
//! | 9 | L3 | `LEFT_JOYSTICK` |
//! | 10 | R3 | `RIGHT_JOYSTICK` |
//!
//! The index of a button is its position in the published button vector.

use std::fmt;

use crate::error::{FakeJoyError, Result};

/// A digital button of the emulated gamepad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Button {
    A,
    B,
    X,
    Y,
    LeftBumper,
    RightBumper,
    Back,
    Start,
    Logitech,
    LeftJoystick,
    RightJoystick,
}

impl Button {
    /// Every button, in Logitech F710 order
    pub const ALL: [Button; 11] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::LeftBumper,
        Button::RightBumper,
        Button::Back,
        Button::Start,
        Button::Logitech,
        Button::LeftJoystick,
        Button::RightJoystick,
    ];

    /// Symbolic name as used by joystick drivers
    pub fn name(self) -> &'static str {
        match self {
            Button::A => "A_BUTTON",
            Button::B => "B_BUTTON",
            Button::X => "X_BUTTON",
            Button::Y => "Y_BUTTON",
            Button::LeftBumper => "LEFT_BUMPER",
            Button::RightBumper => "RIGHT_BUMPER",
            Button::Back => "BACK",
            Button::Start => "START",
            Button::Logitech => "LOGITECH",
            Button::LeftJoystick => "LEFT_JOYSTICK",
            Button::RightJoystick => "RIGHT_JOYSTICK",
        }
    }

    /// Look a button up by its symbolic name
    pub fn from_name(name: &str) -> Option<Button> {
        Button::ALL.into_iter().find(|button| button.name() == name)
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered set of button slots, fixed at construction
///
/// # Examples
///
/// ```
/// use fake_joy::controller::buttons::{Button, ButtonModel};
///
/// let model = ButtonModel::logitech_f710();
/// assert_eq!(model.len(), 11);
/// assert_eq!(model.index_of(Button::LeftBumper), Some(4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonModel {
    buttons: Vec<Button>,
}

impl ButtonModel {
    /// Build a model from an ordered list of buttons
    ///
    /// # Errors
    ///
    /// Returns `InvalidModel` if a button appears twice.
    pub fn new(buttons: Vec<Button>) -> Result<Self> {
        for (i, button) in buttons.iter().enumerate() {
            if buttons[..i].contains(button) {
                return Err(FakeJoyError::InvalidModel(format!(
                    "{} appears more than once",
                    button
                )));
            }
        }
        Ok(Self { buttons })
    }

    /// The Logitech F710 layout
    pub fn logitech_f710() -> Self {
        Self {
            buttons: Button::ALL.to_vec(),
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    /// Whether the model has no slots
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// Position of `button` in the published vector
    pub fn index_of(&self, button: Button) -> Option<usize> {
        self.buttons.iter().position(|&b| b == button)
    }

    /// Iterate over `(index, button)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (usize, Button)> + '_ {
        self.buttons.iter().copied().enumerate()
    }
}

impl Default for ButtonModel {
    fn default() -> Self {
        Self::logitech_f710()
    }
}

/// Per-cycle button vector over a [`ButtonModel`]
///
/// Its length is fixed by the model it was created for.
///
/// # Examples
///
/// ```
/// use fake_joy::controller::buttons::{ButtonModel, ButtonState};
///
/// let mut state = ButtonState::new(&ButtonModel::logitech_f710());
/// state.press(2);
/// assert_eq!(state.active_count(), 1);
/// state.reset();
/// assert_eq!(state.active_count(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pressed: Vec<bool>,
}

impl ButtonState {
    /// All-released state for `model`
    pub fn new(model: &ButtonModel) -> Self {
        Self {
            pressed: vec![false; model.len()],
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.pressed.len()
    }

    /// Whether the state has no slots
    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    /// Mark slot `index` active; out-of-range indices are ignored
    pub fn press(&mut self, index: usize) {
        if let Some(slot) = self.pressed.get_mut(index) {
            *slot = true;
        }
    }

    /// Whether slot `index` is active
    pub fn is_pressed(&self, index: usize) -> bool {
        self.pressed.get(index).copied().unwrap_or(false)
    }

    /// Number of active slots
    pub fn active_count(&self) -> usize {
        self.pressed.iter().filter(|&&p| p).count()
    }

    /// Release every slot
    pub fn reset(&mut self) {
        self.pressed.fill(false);
    }

    /// Slots in model order
    pub fn as_slice(&self) -> &[bool] {
        &self.pressed
    }
}
