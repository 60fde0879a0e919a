//! Session establishment over the raw, multiplexed, and plain UDP stacks.
//!
//! Every entry point validates its address, opens the transport stack it
//! names, and wraps the result in an FEC session:
//!
//! | entry point      | transport      | multiplexer secret | caches    |
//! |------------------|----------------|--------------------|-----------|
//! | `dial`           | raw            | -                  | MSS       |
//! | `dial_mux`       | raw            | caller             | -         |
//! | `dial_mux_udp`   | plain UDP      | default            | -         |
//! | `listen`         | raw            | -                  | listener  |
//! | `listen_mux`     | raw            | caller             | -         |
//! | `listen_mux_udp` | plain UDP      | default            | -         |

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{debug, warn};

use super::addr::validate_addr;
use super::cache::SessionCaches;
use crate::core::constants::{DEFAULT_MUX_CONNECTIONS, DEFAULT_MUX_SECRET, MUX_CIPHER_METHOD};
use crate::core::{
    BlockCrypt, Multiplexer, RawListener, RawTransport, Result, SessionEngine, SessionError,
    SharedConn,
};
use crate::transport::{RawConfig, RawDialer, TransportSettings, UdpConn, UdpDialer, resolve_udp4};

fn check_addr(addr: &str) -> Result<()> {
    validate_addr(addr).map_err(|source| SessionError::InvalidAddress {
        addr: addr.to_string(),
        source,
    })
}

fn log_failure(err: &SessionError) {
    warn!(stage = %err.stage(), addr = err.addr(), error = %err, "session establishment failed");
}

fn warn_default_secret(addr: &str) {
    warn!(addr, "plain UDP multiplexer uses the built-in shared secret");
}

/// Opens FEC sessions over the raw transport, the multiplexer, or plain UDP.
///
/// The raw transport configuration is read once per call from
/// [`TransportSettings`]; the setters only affect calls started after they
/// return. Successful dials and listens are recorded in the shared
/// [`SessionCaches`].
pub struct SessionEstablisher<R, M, E> {
    raw: Arc<R>,
    mux: M,
    engine: E,
    settings: TransportSettings,
    caches: Arc<SessionCaches>,
}

/// Builder for [`SessionEstablisher`].
pub struct SessionEstablisherBuilder<R, M, E> {
    raw: R,
    mux: M,
    engine: E,
    config: RawConfig,
    caches: Option<Arc<SessionCaches>>,
}

impl<R, M, E> SessionEstablisherBuilder<R, M, E>
where
    R: RawTransport + 'static,
    M: Multiplexer,
    E: SessionEngine,
{
    /// Set the initial raw transport configuration.
    pub fn config(mut self, config: RawConfig) -> Self {
        self.config = config;
        self
    }

    /// Record into `caches` instead of a fresh private pair of caches.
    pub fn caches(mut self, caches: Arc<SessionCaches>) -> Self {
        self.caches = Some(caches);
        self
    }

    /// Build the establisher.
    pub fn build(self) -> SessionEstablisher<R, M, E> {
        SessionEstablisher {
            raw: Arc::new(self.raw),
            mux: self.mux,
            engine: self.engine,
            settings: TransportSettings::new(self.config),
            caches: self.caches.unwrap_or_default(),
        }
    }
}

impl<R, M, E> SessionEstablisher<R, M, E>
where
    R: RawTransport + 'static,
    M: Multiplexer,
    E: SessionEngine,
{
    /// Start building an establisher over the given collaborators.
    pub fn builder(raw: R, mux: M, engine: E) -> SessionEstablisherBuilder<R, M, E> {
        SessionEstablisherBuilder {
            raw,
            mux,
            engine,
            config: RawConfig::default(),
            caches: None,
        }
    }

    /// Establisher with default configuration and fresh caches.
    pub fn new(raw: R, mux: M, engine: E) -> Self {
        Self::builder(raw, mux, engine).build()
    }

    /// The raw transport configuration holder.
    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// The caches this establisher records into.
    pub fn caches(&self) -> Arc<SessionCaches> {
        Arc::clone(&self.caches)
    }

    /// The raw transport.
    pub fn raw(&self) -> &R {
        &self.raw
    }

    /// The multiplexer.
    pub fn mux(&self) -> &M {
        &self.mux
    }

    /// The FEC session engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Disable or enable the HTTP disguise.
    pub fn set_no_http(&self, v: bool) {
        self.settings.set_no_http(v);
    }

    /// Set the HTTP disguise host.
    pub fn set_host(&self, v: &str) {
        self.settings.set_host(v);
    }

    /// Set the DSCP value.
    pub fn set_dscp(&self, v: u8) {
        self.settings.set_dscp(v);
    }

    /// If `v` is true, TCP RST packets are ignored.
    pub fn set_ignore_rst(&self, v: bool) {
        self.settings.set_ignore_rst(v);
    }

    /// If `v` is true, the server accepts both HTTP requests and bare TCP.
    pub fn set_mixed(&self, v: bool) {
        self.settings.set_mixed(v);
    }

    /// MSS negotiated by an earlier [`dial`](Self::dial), or 0 if unknown.
    pub fn mss_by_addr(&self, local: SocketAddr, remote: SocketAddr) -> usize {
        self.caches.mss_by_addr(local, remote)
    }

    /// Raw listener opened by an earlier [`listen`](Self::listen).
    pub fn listener_by_addr(&self, local: SocketAddr) -> Option<Arc<dyn RawListener>> {
        self.caches.listener_by_addr(local)
    }

    /// Dial `raddr` over the raw transport and wrap the connection in an FEC
    /// session.
    ///
    /// The negotiated MSS is recorded under the connection's own local and
    /// remote addresses. The entry is kept even if session wrapping fails.
    pub async fn dial(
        &self,
        raddr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
    ) -> Result<E::Session> {
        self.dial_raw(raddr, cipher, data_shards, parity_shards)
            .await
            .inspect_err(log_failure)
    }

    async fn dial_raw(
        &self,
        raddr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
    ) -> Result<E::Session> {
        check_addr(raddr)?;
        let (epoch, config) = self.settings.versioned();

        let conn = self
            .raw
            .dial(raddr, &config)
            .await
            .map_err(|source| SessionError::TransportDial {
                addr: raddr.to_string(),
                source,
            })?;
        let local = conn
            .local_addr()
            .map_err(|source| SessionError::TransportDial {
                addr: raddr.to_string(),
                source,
            })?;
        let remote = conn.remote_addr();
        let mss = conn.mss();
        self.caches.mss().record(local, remote, mss);
        debug!(
            addr = raddr,
            %local,
            %remote,
            mss,
            epoch,
            "raw connection established"
        );

        self.wrap_session(raddr, cipher, data_shards, parity_shards, conn)
            .await
    }

    /// Dial `raddr` through the multiplexer, which opens `connections`
    /// physical raw-transport connections on demand, and wrap the logical
    /// connection in an FEC session.
    pub async fn dial_mux(
        &self,
        raddr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
        secret: &str,
        connections: usize,
    ) -> Result<E::Session> {
        self.dial_mux_raw(raddr, cipher, data_shards, parity_shards, secret, connections)
            .await
            .inspect_err(log_failure)
    }

    async fn dial_mux_raw(
        &self,
        raddr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
        secret: &str,
        connections: usize,
    ) -> Result<E::Session> {
        check_addr(raddr)?;
        let dialer = RawDialer::new(Arc::clone(&self.raw), raddr, self.settings.snapshot());

        let conn = self
            .mux
            .dial(Arc::new(dialer), connections, MUX_CIPHER_METHOD, secret)
            .await
            .map_err(|source| SessionError::Multiplex {
                addr: raddr.to_string(),
                source,
            })?;
        debug!(addr = raddr, connections, "multiplexed raw connection established");

        self.wrap_session(raddr, cipher, data_shards, parity_shards, conn)
            .await
    }

    /// Dial `raddr` through the multiplexer over plain UDP sockets, using the
    /// built-in connection count and shared secret.
    pub async fn dial_mux_udp(
        &self,
        raddr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
    ) -> Result<E::Session> {
        self.dial_mux_udp_inner(raddr, cipher, data_shards, parity_shards)
            .await
            .inspect_err(log_failure)
    }

    async fn dial_mux_udp_inner(
        &self,
        raddr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
    ) -> Result<E::Session> {
        check_addr(raddr)?;
        let remote = resolve_udp4(raddr)
            .await
            .map_err(|source| SessionError::TransportDial {
                addr: raddr.to_string(),
                source,
            })?;
        warn_default_secret(raddr);

        let conn = self
            .mux
            .dial(
                Arc::new(UdpDialer::new(remote)),
                DEFAULT_MUX_CONNECTIONS,
                MUX_CIPHER_METHOD,
                DEFAULT_MUX_SECRET,
            )
            .await
            .map_err(|source| SessionError::Multiplex {
                addr: raddr.to_string(),
                source,
            })?;
        debug!(
            addr = raddr,
            %remote,
            connections = DEFAULT_MUX_CONNECTIONS,
            "multiplexed UDP connection established"
        );

        self.wrap_session(raddr, cipher, data_shards, parity_shards, conn)
            .await
    }

    /// Listen on `laddr` over the raw transport and serve FEC sessions.
    ///
    /// The raw listener is recorded under its bound local address.
    pub async fn listen(
        &self,
        laddr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
    ) -> Result<E::Listener> {
        self.listen_raw(laddr, cipher, data_shards, parity_shards)
            .await
            .inspect_err(log_failure)
    }

    async fn listen_raw(
        &self,
        laddr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
    ) -> Result<E::Listener> {
        check_addr(laddr)?;
        let listener = self.open_raw_listener(laddr).await?;
        let local = listener
            .local_addr()
            .map_err(|source| SessionError::TransportListen {
                addr: laddr.to_string(),
                source,
            })?;
        self.caches.listeners().record(local, Arc::clone(&listener));
        debug!(addr = laddr, %local, "raw listener bound");

        self.serve_sessions(laddr, cipher, data_shards, parity_shards, listener)
            .await
    }

    /// Listen on `laddr` over the raw transport, demultiplex with the
    /// caller's shared secret, and serve FEC sessions.
    ///
    /// The raw listener is not recorded in the listener cache.
    pub async fn listen_mux(
        &self,
        laddr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
        secret: &str,
    ) -> Result<E::Listener> {
        self.listen_mux_raw(laddr, cipher, data_shards, parity_shards, secret)
            .await
            .inspect_err(log_failure)
    }

    async fn listen_mux_raw(
        &self,
        laddr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
        secret: &str,
    ) -> Result<E::Listener> {
        check_addr(laddr)?;
        let listener = self.open_raw_listener(laddr).await?;
        let base: SharedConn = listener;

        let conn = self
            .mux
            .listen(base, MUX_CIPHER_METHOD, secret)
            .await
            .map_err(|source| SessionError::Multiplex {
                addr: laddr.to_string(),
                source,
            })?;
        debug!(addr = laddr, "multiplexed raw listener bound");

        self.serve_sessions(laddr, cipher, data_shards, parity_shards, conn)
            .await
    }

    /// Bind a plain UDP socket at `laddr`, demultiplex with the built-in
    /// shared secret, and serve FEC sessions.
    pub async fn listen_mux_udp(
        &self,
        laddr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
    ) -> Result<E::Listener> {
        self.listen_mux_udp_inner(laddr, cipher, data_shards, parity_shards)
            .await
            .inspect_err(log_failure)
    }

    async fn listen_mux_udp_inner(
        &self,
        laddr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
    ) -> Result<E::Listener> {
        check_addr(laddr)?;
        let listen_err = |source: std::io::Error| SessionError::TransportListen {
            addr: laddr.to_string(),
            source,
        };
        let local = resolve_udp4(laddr).await.map_err(listen_err)?;
        let socket = UdpConn::bind(local).await.map_err(listen_err)?;
        warn_default_secret(laddr);

        let conn = self
            .mux
            .listen(Arc::new(socket), MUX_CIPHER_METHOD, DEFAULT_MUX_SECRET)
            .await
            .map_err(|source| SessionError::Multiplex {
                addr: laddr.to_string(),
                source,
            })?;
        debug!(addr = laddr, %local, "multiplexed UDP listener bound");

        self.serve_sessions(laddr, cipher, data_shards, parity_shards, conn)
            .await
    }

    async fn open_raw_listener(&self, laddr: &str) -> Result<Arc<dyn RawListener>> {
        let config = self.settings.snapshot();
        self.raw
            .listen(laddr, &config)
            .await
            .map_err(|source| SessionError::TransportListen {
                addr: laddr.to_string(),
                source,
            })
    }

    async fn wrap_session(
        &self,
        addr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
        conn: SharedConn,
    ) -> Result<E::Session> {
        self.engine
            .new_session(addr, cipher, data_shards, parity_shards, conn)
            .await
            .map_err(|source| SessionError::SessionWrap {
                addr: addr.to_string(),
                source,
            })
    }

    async fn serve_sessions(
        &self,
        addr: &str,
        cipher: Arc<dyn BlockCrypt>,
        data_shards: usize,
        parity_shards: usize,
        conn: SharedConn,
    ) -> Result<E::Listener> {
        self.engine
            .serve(cipher, data_shards, parity_shards, conn)
            .await
            .map_err(|source| SessionError::SessionWrap {
                addr: addr.to_string(),
                source,
            })
    }
}
