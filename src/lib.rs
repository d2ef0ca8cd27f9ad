//! # Fake Joy Library
//!
//! Drive joystick-consuming robot software from a keyboard.
//!
//! This library turns keystrokes read from a terminal into momentary gamepad
//! button presses and publishes the button vector on a publish/subscribe bus
//! at a fixed rate, the way a real joystick driver would.

pub mod bus;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod logging;
