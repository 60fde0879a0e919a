//! Per-connection metadata recorded by the dial and listen paths.
//!
//! Each cache sits behind one coarse lock. Entries are written on success,
//! overwritten by later successes with the same key, and never removed.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::RawListener;

/// Key of a local/remote address pair: both canonical forms concatenated.
pub fn address_key(local: SocketAddr, remote: SocketAddr) -> String {
    format!("{local}{remote}")
}

/// Negotiated MSS per local/remote address pair.
#[derive(Debug, Default)]
pub struct MssCache {
    entries: Mutex<HashMap<String, usize>>,
}

impl MssCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the MSS negotiated between `local` and `remote`.
    pub fn record(&self, local: SocketAddr, remote: SocketAddr, mss: usize) {
        let key = address_key(local, remote);
        self.entries.lock().insert(key, mss);
    }

    /// MSS for the pair, or 0 if no dial has recorded one.
    pub fn lookup(&self, local: SocketAddr, remote: SocketAddr) -> usize {
        let key = address_key(local, remote);
        self.entries.lock().get(&key).copied().unwrap_or(0)
    }

    /// Number of recorded pairs.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raw listener handle per local address.
#[derive(Default)]
pub struct ListenerCache {
    entries: Mutex<HashMap<String, Arc<dyn RawListener>>>,
}

impl ListenerCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the listener bound at `local`.
    pub fn record(&self, local: SocketAddr, listener: Arc<dyn RawListener>) {
        self.entries.lock().insert(local.to_string(), listener);
    }

    /// Listener bound at `local`, if one was recorded.
    pub fn lookup(&self, local: SocketAddr) -> Option<Arc<dyn RawListener>> {
        self.entries.lock().get(&local.to_string()).cloned()
    }

    /// Number of recorded listeners.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ListenerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("ListenerCache")
            .field("addrs", &entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Both caches, shared between an establisher and whoever needs to look up
/// what its dials and listens produced.
#[derive(Debug, Default)]
pub struct SessionCaches {
    mss: MssCache,
    listeners: ListenerCache,
}

impl SessionCaches {
    /// Create empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// The MSS cache.
    pub fn mss(&self) -> &MssCache {
        &self.mss
    }

    /// The listener cache.
    pub fn listeners(&self) -> &ListenerCache {
        &self.listeners
    }

    /// MSS negotiated between `local` and `remote`, or 0 if unknown.
    pub fn mss_by_addr(&self, local: SocketAddr, remote: SocketAddr) -> usize {
        self.mss.lookup(local, remote)
    }

    /// Raw listener bound at `local`, if any.
    pub fn listener_by_addr(&self, local: SocketAddr) -> Option<Arc<dyn RawListener>> {
        self.listeners.lookup(local)
    }
}
