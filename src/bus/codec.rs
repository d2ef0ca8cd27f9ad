//! # Frame Codec
//!
//! Encodes bus messages into self-describing JSON frames.
//!
//! ## Frame Structure
//!
//! ```text
//! {"topic": "joy", "type": "sensor_msgs/Joy", "msg": { ... }}
//! ```
//!
//! One frame per datagram; consumers dispatch on `topic` and decode `msg`
//! according to `type`.

use bytes::Bytes;
use serde::Serialize;

use super::messages::Message;
use crate::error::Result;

#[derive(Serialize)]
struct Envelope<'a, M> {
    topic: &'a str,
    #[serde(rename = "type")]
    type_name: &'static str,
    msg: &'a M,
}

/// Encode a message for `topic` into a frame
///
/// # Errors
///
/// Returns `Codec` if the message cannot be serialized.
///
/// # Examples
///
/// ```
/// use fake_joy::bus::codec::encode_frame;
/// use fake_joy::bus::messages::Twist;
///
/// let frame = encode_frame("key_vel", &Twist::default())?;
/// assert!(frame.starts_with(b"{\"topic\":\"key_vel\""));
/// # Ok::<(), fake_joy::error::FakeJoyError>(())
/// ```
pub fn encode_frame<M: Message>(topic: &str, msg: &M) -> Result<Bytes> {
    let envelope = Envelope {
        topic,
        type_name: M::TYPE_NAME,
        msg,
    };
    Ok(Bytes::from(serde_json::to_vec(&envelope)?))
}
