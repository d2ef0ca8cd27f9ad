//! # Bus Module
//!
//! Publish side of the publish/subscribe bus.
//!
//! This module handles:
//! - Advertising typed topics
//! - Encoding messages into frames
//! - Handing frames to a transport (UDP datagrams in production)
//!
//! Delivery is fire-and-forget: a failed send is reported to the caller once
//! and never retried.

pub mod codec;
pub mod messages;
pub mod transport;

use std::marker::PhantomData;

use tracing::{debug, info};

use crate::error::Result;
use codec::encode_frame;
use messages::Message;
use transport::BusTransport;

/// Typed handle to an advertised topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic<M> {
    name: String,
    _message: PhantomData<fn(M)>,
}

impl<M> Topic<M> {
    /// Topic name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Publisher node on the bus
///
/// # Examples
///
/// ```no_run
/// use fake_joy::bus::Bus;
/// use fake_joy::bus::messages::Twist;
/// use fake_joy::bus::transport::UdpTransport;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> anyhow::Result<()> {
///     let transport = UdpTransport::bind(
///         "0.0.0.0:0".parse()?,
///         "127.0.0.1:7400".parse()?,
///     ).await?;
///     let mut bus = Bus::new("teleop", transport);
///     let topic = bus.advertise::<Twist>("key_vel");
///     bus.publish(&topic, &Twist::default()).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Bus<T: BusTransport> {
    node_name: String,
    transport: T,
}

impl<T: BusTransport> Bus<T> {
    /// Create a node publishing through `transport`
    pub fn new(node_name: &str, transport: T) -> Self {
        Self {
            node_name: node_name.to_string(),
            transport,
        }
    }

    /// Name used as the frame id of published headers
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Declare an outbound topic
    pub fn advertise<M: Message>(&mut self, name: &str) -> Topic<M> {
        info!("Node {} advertising {} [{}]", self.node_name, name, M::TYPE_NAME);
        Topic {
            name: name.to_string(),
            _message: PhantomData,
        }
    }

    /// Encode and send one message, without retry
    ///
    /// # Errors
    ///
    /// Returns `Codec` if encoding fails or `Io` if the transport rejects
    /// the frame.
    pub async fn publish<M: Message>(&mut self, topic: &Topic<M>, msg: &M) -> Result<()> {
        let frame = encode_frame(&topic.name, msg)?;
        let len = frame.len();
        self.transport.send(frame).await?;
        debug!("Published {} ({} bytes)", topic.name, len);
        Ok(())
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::messages::{Header, Joy, Twist};
    use super::transport::mocks::MockTransport;
    use super::*;
    use crate::error::FakeJoyError;
    use serde_json::Value;

    #[test]
    fn test_advertise_names_topic() {
        let mut bus = Bus::new("teleop", MockTransport::new());
        let joy = bus.advertise::<Joy>("joy");
        let vel = bus.advertise::<Twist>("key_vel");

        assert_eq!(joy.name(), "joy");
        assert_eq!(vel.name(), "key_vel");
        assert_eq!(bus.node_name(), "teleop");
    }

    #[tokio::test]
    async fn test_publish_sends_one_frame() {
        let transport = MockTransport::new();
        let mut bus = Bus::new("teleop", transport.clone());
        let topic = bus.advertise::<Joy>("joy");

        let joy = Joy::new(Header::now(0, "teleop"), vec![false, true]);
        bus.publish(&topic, &joy).await.unwrap();

        let frames = transport.get_sent_frames();
        assert_eq!(frames.len(), 1);
        let value: Value = serde_json::from_slice(&frames[0]).unwrap();
        assert_eq!(value["topic"], "joy");
        assert_eq!(value["msg"]["buttons"], serde_json::json!([false, true]));
    }

    #[tokio::test]
    async fn test_publish_failure_is_not_retried() {
        let transport = MockTransport::new();
        transport.set_send_error(std::io::ErrorKind::ConnectionRefused);
        let mut bus = Bus::new("teleop", transport.clone());
        let topic = bus.advertise::<Twist>("key_vel");

        let result = bus.publish(&topic, &Twist::default()).await;

        assert!(matches!(result, Err(FakeJoyError::Io(_))));
        assert!(bus.transport().get_sent_frames().is_empty());
    }
}
