//! Single-use UDP endpoint.
//!
//! An [`AttemptSocket`] lives for exactly one attempt. Dropping it closes the
//! underlying socket, so any datagram arriving afterwards is never read.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use rand::Rng;
use tokio::net::UdpSocket;
use tracing::trace;

use super::error::TransportError;
use crate::core::{EPHEMERAL_PORT_RANGE, MAX_PACKET_SIZE};

/// Pick a local port from the ephemeral range.
pub fn ephemeral_port() -> u16 {
    rand::thread_rng().gen_range(EPHEMERAL_PORT_RANGE)
}

/// Resolve `host:port`, taking the first address returned.
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr, TransportError> {
    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|source| TransportError::Resolve {
            host: host.to_string(),
            port,
            source,
        })?;
    addrs.next().ok_or_else(|| TransportError::NoAddress {
        host: host.to_string(),
        port,
    })
}

/// Async UDP socket owned by one attempt.
#[derive(Debug)]
pub struct AttemptSocket {
    /// The underlying UDP socket.
    socket: UdpSocket,
    /// Receive buffer.
    recv_buffer: Vec<u8>,
    /// Bound local address.
    local_addr: SocketAddr,
}

impl AttemptSocket {
    /// Bind to the given local address.
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        let local_addr = socket.local_addr()?;
        trace!(%local_addr, "socket listening");
        Ok(Self {
            socket,
            recv_buffer: vec![0u8; MAX_PACKET_SIZE],
            local_addr,
        })
    }

    /// Bind `port` on the unspecified address of `remote`'s family.
    pub async fn bind_for(remote: SocketAddr, port: u16) -> io::Result<Self> {
        let local = match remote {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, port)),
        };
        Self::bind(local).await
    }

    /// Get the local address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Send data to a specific address.
    pub async fn send_to(&self, data: &[u8], addr: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(data, addr).await
    }

    /// Receive one datagram and return the sender's address.
    pub async fn recv_from(&mut self) -> io::Result<(&[u8], SocketAddr)> {
        let (len, addr) = self.socket.recv_from(&mut self.recv_buffer).await?;
        Ok((&self.recv_buffer[..len], addr))
    }

    /// Close the socket. Equivalent to dropping it.
    pub fn close(self) {}
}

impl Drop for AttemptSocket {
    fn drop(&mut self) {
        trace!(local_addr = %self.local_addr, "socket closed");
    }
}
