//! # Bus Message Types
//!
//! Messages published by the teleop node, shaped after the ones a real
//! joystick driver emits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message type that can travel on a bus topic
pub trait Message: Serialize {
    /// Wire type name carried in the frame envelope
    const TYPE_NAME: &'static str;
}

/// Message metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Per-topic sequence number, starting at 0
    pub seq: u64,
    /// Creation time
    pub stamp: DateTime<Utc>,
    /// Name of the publishing node
    pub frame_id: String,
}

/// Joystick state: analog axes and digital buttons
///
/// # Examples
///
/// ```
/// use fake_joy::bus::messages::{Header, Joy};
///
/// let joy = Joy::new(Header::now(0, "teleop"), vec![false, true]);
/// assert!(joy.axes.is_empty());
/// assert_eq!(joy.buttons, vec![false, true]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joy {
    pub header: Header,
    pub axes: Vec<f32>,
    pub buttons: Vec<bool>,
}

/// Planar velocity command
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Twist {
    pub linear: f64,
    pub angular: f64,
}

impl Header {
    /// Header stamped with the current time
    pub fn now(seq: u64, frame_id: &str) -> Self {
        Self {
            seq,
            stamp: Utc::now(),
            frame_id: frame_id.to_string(),
        }
    }
}

impl Joy {
    /// Joy message without axes
    pub fn new(header: Header, buttons: Vec<bool>) -> Self {
        Self {
            header,
            axes: Vec::new(),
            buttons,
        }
    }
}

impl Message for Joy {
    const TYPE_NAME: &'static str = "sensor_msgs/Joy";
}

impl Message for Twist {
    const TYPE_NAME: &'static str = "geometry_msgs/Twist";
}
