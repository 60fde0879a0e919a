//! Recording stand-ins for the transport, multiplexer and session engine.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::{
    BlockCrypt, CipherMethod, Dialer, Multiplexer, PacketConn, RawConn, RawListener,
    RawTransport, SessionEngine, SharedConn,
};
use crate::transport::RawConfig;

fn parse(addr: &str) -> io::Result<SocketAddr> {
    addr.parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

/// Raw connection with fixed addresses and MSS.
#[derive(Debug)]
pub struct StubConn {
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub mss: usize,
}

#[async_trait]
impl PacketConn for StubConn {
    async fn send_to(&self, buf: &[u8], _target: SocketAddr) -> io::Result<usize> {
        Ok(buf.len())
    }

    async fn recv_from(&self, _buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        Err(io::ErrorKind::WouldBlock.into())
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(self.local)
    }
}

impl RawConn for StubConn {
    fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    fn mss(&self) -> usize {
        self.mss
    }
}

/// Raw listener bound at a fixed address.
#[derive(Debug)]
pub struct StubListener {
    pub local: SocketAddr,
}

impl StubListener {
    pub fn new(local: SocketAddr) -> Self {
        Self { local }
    }
}

#[async_trait]
impl PacketConn for StubListener {
    async fn send_to(&self, buf: &[u8], _target: SocketAddr) -> io::Result<usize> {
        Ok(buf.len())
    }

    async fn recv_from(&self, _buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        Err(io::ErrorKind::WouldBlock.into())
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(self.local)
    }
}

impl RawListener for StubListener {}

/// Raw transport that records every call and the configuration it saw.
///
/// Dialed connections get local address `10.0.0.2:<40000 + n>` and the
/// parsed target as remote address.
#[derive(Default)]
pub struct StubRawTransport {
    pub mss: usize,
    pub fail: AtomicBool,
    next_port: AtomicU16,
    pub dials: Mutex<Vec<(String, RawConfig)>>,
    pub listens: Mutex<Vec<(String, RawConfig)>>,
    pub last_listener: Mutex<Option<Arc<dyn RawListener>>>,
}

impl StubRawTransport {
    pub fn with_mss(mss: usize) -> Self {
        Self {
            mss,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        let raw = Self::default();
        raw.fail.store(true, Ordering::SeqCst);
        raw
    }

    pub fn dial_count(&self) -> usize {
        self.dials.lock().len()
    }

    pub fn listen_count(&self) -> usize {
        self.listens.lock().len()
    }
}

#[async_trait]
impl RawTransport for StubRawTransport {
    async fn dial(&self, addr: &str, config: &RawConfig) -> io::Result<Arc<dyn RawConn>> {
        self.dials.lock().push((addr.to_string(), config.clone()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::ErrorKind::ConnectionRefused.into());
        }
        let port = 40000 + self.next_port.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubConn {
            local: SocketAddr::from(([10, 0, 0, 2], port)),
            remote: parse(addr)?,
            mss: self.mss,
        }))
    }

    async fn listen(&self, addr: &str, config: &RawConfig) -> io::Result<Arc<dyn RawListener>> {
        self.listens.lock().push((addr.to_string(), config.clone()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::ErrorKind::AddrInUse.into());
        }
        let listener: Arc<dyn RawListener> = Arc::new(StubListener::new(parse(addr)?));
        *self.last_listener.lock() = Some(Arc::clone(&listener));
        Ok(listener)
    }
}

/// One recorded multiplexer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxCall {
    pub connections: usize,
    pub method: CipherMethod,
    pub secret: String,
}

/// Multiplexer that opens every physical connection through the dialer and
/// hands back the first one as the logical connection.
#[derive(Default)]
pub struct StubMux {
    pub fail: AtomicBool,
    pub dials: Mutex<Vec<MuxCall>>,
    pub listens: Mutex<Vec<MuxCall>>,
}

impl StubMux {
    pub fn failing() -> Self {
        let mux = Self::default();
        mux.fail.store(true, Ordering::SeqCst);
        mux
    }
}

#[async_trait]
impl Multiplexer for StubMux {
    async fn dial(
        &self,
        dialer: Arc<dyn Dialer>,
        connections: usize,
        method: CipherMethod,
        secret: &str,
    ) -> io::Result<SharedConn> {
        self.dials.lock().push(MuxCall {
            connections,
            method,
            secret: secret.to_string(),
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::Error::other("handshake rejected"));
        }
        let mut first = None;
        for _ in 0..connections {
            let conn = dialer.dial().await?;
            if first.is_none() {
                first = Some(conn);
            }
        }
        first.ok_or_else(|| io::Error::other("no physical connections"))
    }

    async fn listen(
        &self,
        base: SharedConn,
        method: CipherMethod,
        secret: &str,
    ) -> io::Result<SharedConn> {
        self.listens.lock().push(MuxCall {
            connections: 0,
            method,
            secret: secret.to_string(),
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::Error::other("handshake rejected"));
        }
        Ok(base)
    }
}

/// Client session produced by [`StubEngine`].
pub struct StubSession {
    pub addr: String,
    pub data_shards: usize,
    pub parity_shards: usize,
    pub conn: SharedConn,
}

/// Server handle produced by [`StubEngine`].
pub struct StubSessionListener {
    pub data_shards: usize,
    pub parity_shards: usize,
    pub conn: SharedConn,
}

/// Session engine that accepts everything unless told to fail.
#[derive(Default)]
pub struct StubEngine {
    pub fail: AtomicBool,
}

impl StubEngine {
    pub fn failing() -> Self {
        let engine = Self::default();
        engine.fail.store(true, Ordering::SeqCst);
        engine
    }
}

#[async_trait]
impl SessionEngine for StubEngine {
    type Session = StubSession;
    type Listener = StubSessionListener;

    async fn new_session(
        &self,
        addr: &str,
        _cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
        conn: SharedConn,
    ) -> io::Result<StubSession> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "bad shard count"));
        }
        Ok(StubSession {
            addr: addr.to_string(),
            data_shards,
            parity_shards,
            conn,
        })
    }

    async fn serve(
        &self,
        _cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
        conn: SharedConn,
    ) -> io::Result<StubSessionListener> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "bad shard count"));
        }
        Ok(StubSessionListener {
            data_shards,
            parity_shards,
            conn,
        })
    }
}
