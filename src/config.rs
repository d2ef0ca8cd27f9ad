//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and every field is optional; a missing file section falls
//! back to the documented defaults, so an empty file is a valid
//! configuration.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use crate::error::{FakeJoyError, Result};

/// Smallest logical line count that still fits the status screen.
pub const MIN_DISPLAY_LINES: usize = 7;

/// Highest accepted sampling rate in Hz.
pub const MAX_TICK_RATE: f64 = 1000.0;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub teleop: TeleopConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Sampling loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TeleopConfig {
    /// Loop frequency in ticks per second
    #[serde(default = "default_tick_rate", alias = "hz")]
    pub tick_rate: f64,

    /// Reserved for the velocity channel, never applied
    #[serde(default = "default_forward_rate")]
    pub forward_rate: f64,

    /// Reserved for the velocity channel, never applied
    #[serde(default = "default_backward_rate")]
    pub backward_rate: f64,

    /// Reserved for the velocity channel, never applied
    #[serde(default = "default_rotation_rate")]
    pub rotation_rate: f64,
}

/// Terminal window configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_lines")]
    pub lines: usize,

    #[serde(default = "default_margin")]
    pub margin: u16,

    #[serde(default)]
    pub beep_on_unmapped: bool,
}

/// Publish/subscribe bus configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BusConfig {
    #[serde(default = "default_node_name")]
    pub node_name: String,

    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_target")]
    pub target: String,

    #[serde(default = "default_joy_topic")]
    pub joy_topic: String,

    #[serde(default = "default_velocity_topic")]
    pub velocity_topic: String,
}

/// Log file configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    #[serde(default = "default_level")]
    pub level: String,
}

// Default value functions
fn default_tick_rate() -> f64 { 10.0 }
fn default_forward_rate() -> f64 { 0.8 }
fn default_backward_rate() -> f64 { 0.5 }
fn default_rotation_rate() -> f64 { 1.0 }

fn default_lines() -> usize { 10 }
fn default_margin() -> u16 { 10 }

fn default_node_name() -> String { "fake_joy_teleop".to_string() }
fn default_bind() -> String { "0.0.0.0:0".to_string() }
fn default_target() -> String { "127.0.0.1:7400".to_string() }
fn default_joy_topic() -> String { "joy".to_string() }
fn default_velocity_topic() -> String { "key_vel".to_string() }

fn default_log_dir() -> String { "./logs".to_string() }
fn default_file_prefix() -> String { "fake-joy.log".to_string() }
fn default_level() -> String { "info".to_string() }

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            forward_rate: default_forward_rate(),
            backward_rate: default_backward_rate(),
            rotation_rate: default_rotation_rate(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            lines: default_lines(),
            margin: default_margin(),
            beep_on_unmapped: false,
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            node_name: default_node_name(),
            bind: default_bind(),
            target: default_target(),
            joy_topic: default_joy_topic(),
            velocity_topic: default_velocity_topic(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file_prefix: default_file_prefix(),
            level: default_level(),
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> FakeJoyError {
    FakeJoyError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fake_joy::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        let tick_rate = self.teleop.tick_rate;
        if !tick_rate.is_finite() || tick_rate <= 0.0 || tick_rate > MAX_TICK_RATE {
            return Err(invalid(format!(
                "tick_rate must be greater than 0 and at most {}",
                MAX_TICK_RATE
            )));
        }

        for (name, value) in [
            ("forward_rate", self.teleop.forward_rate),
            ("backward_rate", self.teleop.backward_rate),
            ("rotation_rate", self.teleop.rotation_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{} must be a finite, non-negative number", name)));
            }
        }

        if self.display.lines < MIN_DISPLAY_LINES {
            return Err(invalid(format!(
                "display lines must be at least {}",
                MIN_DISPLAY_LINES
            )));
        }

        if self.bus.node_name.is_empty() {
            return Err(invalid("node_name cannot be empty"));
        }

        for (name, value) in [("bind", &self.bus.bind), ("target", &self.bus.target)] {
            if value.parse::<SocketAddr>().is_err() {
                return Err(invalid(format!("{} must be a socket address, got '{}'", name, value)));
            }
        }

        if self.bus.joy_topic.is_empty() || self.bus.velocity_topic.is_empty() {
            return Err(invalid("topic names cannot be empty"));
        }

        if self.bus.joy_topic == self.bus.velocity_topic {
            return Err(invalid("joy_topic and velocity_topic must differ"));
        }

        if self.logging.dir.is_empty() || self.logging.file_prefix.is_empty() {
            return Err(invalid("logging dir and file_prefix cannot be empty"));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("log level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }

    /// Bus target address, already checked by [`Config::validate`]
    pub fn target_addr(&self) -> Result<SocketAddr> {
        self.bus
            .target
            .parse()
            .map_err(|_| invalid(format!("target must be a socket address, got '{}'", self.bus.target)))
    }

    /// Local bind address, already checked by [`Config::validate`]
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bus
            .bind
            .parse()
            .map_err(|_| invalid(format!("bind must be a socket address, got '{}'", self.bus.bind)))
    }
}
