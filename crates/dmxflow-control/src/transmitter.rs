//! UDP transmission
//!
//! The scheduler talks to the network through the [`Transport`] trait so that
//! universes can be driven by an in-memory transport in tests.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;

use crate::{error::ControlError, Result};

/// Datagram sink used by the transmitter
pub trait Transport: Send + Sync + 'static {
    /// Send one datagram, returning the number of bytes written
    fn send_to(
        &self,
        bytes: &[u8],
        destination: SocketAddr,
    ) -> impl Future<Output = io::Result<usize>> + Send;
}

/// Transport over a bound tokio UDP socket
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind the sending socket.
    ///
    /// A socket that cannot be bound (address in use, permission denied) is a
    /// [`ControlError::Configuration`] error.
    pub async fn bind(address: SocketAddr, broadcast: bool) -> Result<Self> {
        let socket = UdpSocket::bind(address).await.map_err(|e| {
            ControlError::Configuration(format!(
                "Failed to bind Art-Net socket on {}: {}",
                address, e
            ))
        })?;

        if broadcast {
            socket.set_broadcast(true).map_err(|e| {
                ControlError::Configuration(format!("Failed to enable broadcast: {}", e))
            })?;
        }

        tracing::info!(
            "Art-Net socket bound to {} (broadcast: {})",
            socket.local_addr()?,
            broadcast
        );

        Ok(Self { socket })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

impl Transport for UdpTransport {
    async fn send_to(&self, bytes: &[u8], destination: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(bytes, destination).await
    }
}

/// Sends encoded packets through a shared transport.
#[derive(Debug)]
pub struct Transmitter<T> {
    transport: Arc<T>,
}

impl<T> Clone for Transmitter<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
        }
    }
}

impl<T: Transport> Transmitter<T> {
    /// Wrap a transport
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send one datagram. Failures are returned, never retried.
    pub async fn send(&self, destination: SocketAddr, bytes: &[u8]) -> Result<usize> {
        self.transport
            .send_to(bytes, destination)
            .await
            .map_err(|source| ControlError::Transport {
                destination,
                source,
            })
    }
}
