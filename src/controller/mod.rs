//! # Controller Module
//!
//! Keyboard-driven fake gamepad.
//!
//! This module handles:
//! - The button model of the emulated gamepad (Logitech F710 layout)
//! - Mapping keystrokes to buttons
//! - The fixed-rate drain/render/publish/reset loop

pub mod buttons;
pub mod keymap;
pub mod teleop;
