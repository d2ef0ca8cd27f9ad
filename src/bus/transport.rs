//! Trait abstraction for bus transports to enable testing

use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::info;

/// Trait for delivering encoded frames to bus subscribers
#[async_trait]
pub trait BusTransport: Send {
    /// Send one frame, best effort
    async fn send(&mut self, frame: Bytes) -> io::Result<()>;
}

/// Transport sending each frame as one UDP datagram to a fixed target
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpTransport {
    /// Bind a local socket and fix the destination
    ///
    /// # Errors
    ///
    /// Returns error if the local address cannot be bound.
    pub async fn bind(local: SocketAddr, target: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(local).await?;
        info!("Bus socket bound at {}, publishing to {}", socket.local_addr()?, target);
        Ok(Self { socket, target })
    }

    /// Destination of published frames
    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

#[async_trait]
impl BusTransport for UdpTransport {
    async fn send(&mut self, frame: Bytes) -> io::Result<()> {
        let sent = self.socket.send_to(&frame, self.target).await?;
        if sent != frame.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("datagram truncated: {} of {} bytes", sent, frame.len()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock transport recording every frame
    #[derive(Clone)]
    pub struct MockTransport {
        pub sent_frames: Arc<Mutex<Vec<Bytes>>>,
        pub send_error: Arc<Mutex<Option<io::ErrorKind>>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                sent_frames: Arc::new(Mutex::new(Vec::new())),
                send_error: Arc::new(Mutex::new(None)),
            }
        }

        pub fn get_sent_frames(&self) -> Vec<Bytes> {
            self.sent_frames.lock().unwrap().clone()
        }

        pub fn set_send_error(&self, error: io::ErrorKind) {
            *self.send_error.lock().unwrap() = Some(error);
        }
    }

    #[async_trait]
    impl BusTransport for MockTransport {
        async fn send(&mut self, frame: Bytes) -> io::Result<()> {
            if let Some(error) = *self.send_error.lock().unwrap() {
                return Err(io::Error::new(error, "Mock send error"));
            }
            self.sent_frames.lock().unwrap().push(frame);
            Ok(())
        }
    }
}
