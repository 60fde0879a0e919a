//! Raw transport dialer handed to the multiplexer.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;

use super::config::RawConfig;
use crate::core::{Dialer, RawTransport, SharedConn};

/// Opens a raw-transport connection to a fixed address on every dial.
///
/// The configuration snapshot is captured when the dialer is built, so all
/// physical connections of one multiplexed session share the same settings.
pub struct RawDialer<R: ?Sized> {
    raw: Arc<R>,
    addr: String,
    config: Arc<RawConfig>,
}

impl<R: RawTransport + ?Sized> RawDialer<R> {
    /// Dial `addr` through `raw` with `config`.
    pub fn new(raw: Arc<R>, addr: impl Into<String>, config: Arc<RawConfig>) -> Self {
        Self {
            raw,
            addr: addr.into(),
            config,
        }
    }

    /// Address every connection is made to.
    pub fn addr(&self) -> &str {
        &self.addr
    }
}

#[async_trait]
impl<R: RawTransport + ?Sized + 'static> Dialer for RawDialer<R> {
    async fn dial(&self) -> io::Result<SharedConn> {
        let conn = self.raw.dial(&self.addr, &self.config).await?;
        tracing::trace!(addr = %self.addr, mss = conn.mss(), "raw physical connection opened");
        let conn: SharedConn = conn;
        Ok(conn)
    }
}
