//! Collaborator traits for session establishment.
//!
//! The establisher never touches packets itself. It opens the transport stack
//! through these traits and hands the result to a [`SessionEngine`].
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        FEC session (SessionEngine)      │
//! ├─────────────────────────────────────────┤
//! │     Multiplexer (optional)              │
//! ├─────────────────────────────────────────┤
//! │  RawTransport  │       plain UDP        │
//! └─────────────────────────────────────────┘
//! ```

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::transport::RawConfig;

/// A shared, datagram-oriented connection or listener.
pub type SharedConn = Arc<dyn PacketConn>;

/// Datagram I/O over any underlying transport.
#[async_trait]
pub trait PacketConn: Send + Sync {
    /// Send one datagram to `target`.
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize>;

    /// Receive one datagram and the address it came from.
    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;

    /// Local address the connection is bound to.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

/// A connection opened by the raw transport.
pub trait RawConn: PacketConn {
    /// Peer address after resolution.
    fn remote_addr(&self) -> SocketAddr;

    /// Maximum segment size negotiated on the wire.
    fn mss(&self) -> usize;
}

/// A listener opened by the raw transport.
///
/// Handles are cached by local address, so callers can reach the listener
/// behind a session listener later (e.g. to tune accept behaviour).
pub trait RawListener: PacketConn {}

/// The obfuscating raw transport.
///
/// Every call receives the configuration snapshot in effect when the
/// establishment call started.
#[async_trait]
pub trait RawTransport: Send + Sync {
    /// Connect to `addr`.
    async fn dial(&self, addr: &str, config: &RawConfig) -> io::Result<Arc<dyn RawConn>>;

    /// Bind a listener at `addr`.
    async fn listen(&self, addr: &str, config: &RawConfig) -> io::Result<Arc<dyn RawListener>>;
}

/// Opens one physical connection each time the multiplexer asks for one.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Open a new physical connection.
    async fn dial(&self) -> io::Result<SharedConn>;
}

/// Stream cipher used between multiplexer endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMethod {
    /// ChaCha20 with the 96-bit IETF nonce.
    Chacha20Ietf,
}

impl CipherMethod {
    /// Name understood by multiplexer implementations.
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherMethod::Chacha20Ietf => "chacha20-ietf",
        }
    }
}

impl std::fmt::Display for CipherMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spreads one logical connection over several physical ones.
#[async_trait]
pub trait Multiplexer: Send + Sync {
    /// Build a logical connection from `connections` physical ones opened
    /// through `dialer`.
    async fn dial(
        &self,
        dialer: Arc<dyn Dialer>,
        connections: usize,
        method: CipherMethod,
        secret: &str,
    ) -> io::Result<SharedConn>;

    /// Demultiplex logical connections arriving on `base`.
    async fn listen(
        &self,
        base: SharedConn,
        method: CipherMethod,
        secret: &str,
    ) -> io::Result<SharedConn>;
}

/// Packet cipher owned by the caller and used by the FEC session engine.
pub trait BlockCrypt: Send + Sync {
    /// Encrypt `src` into `dst`.
    fn encrypt(&self, dst: &mut [u8], src: &[u8]);

    /// Decrypt `src` into `dst`.
    fn decrypt(&self, dst: &mut [u8], src: &[u8]);
}

/// Pass-through cipher: copies bytes unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneBlockCrypt;

impl BlockCrypt for NoneBlockCrypt {
    fn encrypt(&self, dst: &mut [u8], src: &[u8]) {
        let n = dst.len().min(src.len());
        dst[..n].copy_from_slice(&src[..n]);
    }

    fn decrypt(&self, dst: &mut [u8], src: &[u8]) {
        let n = dst.len().min(src.len());
        dst[..n].copy_from_slice(&src[..n]);
    }
}

/// Forward-error-correction packet session engine.
#[async_trait]
pub trait SessionEngine: Send + Sync {
    /// Client session handle.
    type Session: Send;

    /// Server handle that yields per-peer sessions.
    type Listener: Send;

    /// Wrap an open connection to `addr` in a client session.
    async fn new_session(
        &self,
        addr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
        conn: SharedConn,
    ) -> io::Result<Self::Session>;

    /// Serve sessions for every peer that sends packets to `conn`.
    async fn serve(
        &self,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
        conn: SharedConn,
    ) -> io::Result<Self::Listener>;
}
