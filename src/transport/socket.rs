//! Plain UDP sockets for the multiplexed plain-UDP variants.
//!
//! Provides a [`PacketConn`] over a tokio UDP socket and the [`UdpDialer`]
//! the multiplexer uses to open its physical connections.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::{UdpSocket, lookup_host};

use crate::core::{Dialer, PacketConn, SharedConn};

/// Resolve `addr` ("host:port") to its first IPv4 socket address.
pub async fn resolve_udp4(addr: &str) -> io::Result<SocketAddr> {
    lookup_host(addr)
        .await?
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no IPv4 address for {addr}"),
            )
        })
}

/// A UDP socket usable as a [`PacketConn`].
#[derive(Debug)]
pub struct UdpConn {
    socket: UdpSocket,
}

impl UdpConn {
    /// Bind a socket at `addr`.
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self::from_socket(socket))
    }

    /// Bind an ephemeral IPv4 socket and connect it to `remote`.
    pub async fn connect(remote: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.connect(remote).await?;
        Ok(Self::from_socket(socket))
    }

    /// Wrap an existing socket.
    pub fn from_socket(socket: UdpSocket) -> Self {
        Self { socket }
    }

    /// Peer address of a connected socket.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.socket.peer_addr()
    }

    /// Get a reference to the underlying socket.
    pub fn inner(&self) -> &UdpSocket {
        &self.socket
    }
}

#[async_trait]
impl PacketConn for UdpConn {
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(buf, target).await
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

/// Opens a fresh connected UDP socket to a fixed remote on every dial.
#[derive(Debug, Clone, Copy)]
pub struct UdpDialer {
    remote: SocketAddr,
}

impl UdpDialer {
    /// Dial `remote` on demand.
    pub fn new(remote: SocketAddr) -> Self {
        Self { remote }
    }

    /// Remote every connection is made to.
    pub fn remote(&self) -> SocketAddr {
        self.remote
    }
}

#[async_trait]
impl Dialer for UdpDialer {
    async fn dial(&self) -> io::Result<SharedConn> {
        let conn = UdpConn::connect(self.remote).await?;
        Ok(Arc::new(conn))
    }
}
