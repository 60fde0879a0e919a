//! Raw transport configuration.
//!
//! [`RawConfig`] is an immutable value. [`TransportSettings`] publishes the
//! current one; every dial or listen call loads a single snapshot when it
//! starts and uses that snapshot for its whole lifetime, so setters racing
//! with in-flight calls never produce a half-applied configuration.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::core::constants::DEFAULT_DSCP;

/// Settings applied to every raw transport dial and listen.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct RawConfig {
    /// Disable the HTTP disguise.
    pub no_http: bool,

    /// Host header used by the HTTP disguise. Empty means transport default.
    pub host: String,

    /// DSCP value written to outgoing packets.
    pub dscp: u8,

    /// Ignore TCP RST packets from middleboxes.
    pub ignore_rst: bool,

    /// Accept both disguised HTTP and bare TCP on the server side.
    pub mixed: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            no_http: false,
            host: String::new(),
            dscp: DEFAULT_DSCP,
            ignore_rst: false,
            mixed: false,
        }
    }
}

impl RawConfig {
    /// Set whether the HTTP disguise is disabled.
    pub fn with_no_http(mut self, no_http: bool) -> Self {
        self.no_http = no_http;
        self
    }

    /// Set the disguise host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the DSCP value.
    pub fn with_dscp(mut self, dscp: u8) -> Self {
        self.dscp = dscp;
        self
    }

    /// Set whether TCP RST packets are ignored.
    pub fn with_ignore_rst(mut self, ignore_rst: bool) -> Self {
        self.ignore_rst = ignore_rst;
        self
    }

    /// Set whether the server accepts mixed HTTP and TCP.
    pub fn with_mixed(mut self, mixed: bool) -> Self {
        self.mixed = mixed;
        self
    }
}

#[cfg(feature = "config")]
impl RawConfig {
    /// Parse a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, crate::core::ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, crate::core::ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, crate::core::ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), crate::core::ConfigError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

/// A published configuration together with its update count.
#[derive(Debug)]
struct Versioned {
    epoch: u64,
    config: Arc<RawConfig>,
}

/// The current [`RawConfig`] and how many times it has been replaced.
///
/// The epoch is published together with the configuration, so a reader
/// always sees the pair that was stored by the same update.
#[derive(Debug)]
pub struct TransportSettings {
    current: ArcSwap<Versioned>,
}

impl TransportSettings {
    /// Start from `initial` at epoch zero.
    pub fn new(initial: RawConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(Versioned {
                epoch: 0,
                config: Arc::new(initial),
            }),
        }
    }

    /// Snapshot of the configuration in effect now.
    pub fn snapshot(&self) -> Arc<RawConfig> {
        Arc::clone(&self.current.load().config)
    }

    /// Snapshot of the configuration in effect now and its epoch.
    pub fn versioned(&self) -> (u64, Arc<RawConfig>) {
        let cur = self.current.load();
        (cur.epoch, Arc::clone(&cur.config))
    }

    /// Number of updates published so far.
    pub fn epoch(&self) -> u64 {
        self.current.load().epoch
    }

    /// Replace the whole configuration.
    pub fn replace(&self, config: RawConfig) {
        let config = Arc::new(config);
        self.current.rcu(|cur| Versioned {
            epoch: cur.epoch + 1,
            config: Arc::clone(&config),
        });
    }

    fn update(&self, f: impl Fn(RawConfig) -> RawConfig) {
        self.current.rcu(|cur| Versioned {
            epoch: cur.epoch + 1,
            config: Arc::new(f(RawConfig::clone(&cur.config))),
        });
    }

    /// Disable or enable the HTTP disguise.
    pub fn set_no_http(&self, v: bool) {
        self.update(|c| c.with_no_http(v));
    }

    /// Set the HTTP disguise host.
    pub fn set_host(&self, v: &str) {
        self.update(|c| c.with_host(v));
    }

    /// Set the DSCP value.
    pub fn set_dscp(&self, v: u8) {
        self.update(|c| c.with_dscp(v));
    }

    /// If `v` is true, TCP RST packets are ignored.
    pub fn set_ignore_rst(&self, v: bool) {
        self.update(|c| c.with_ignore_rst(v));
    }

    /// If `v` is true, the server accepts both HTTP requests and bare TCP.
    pub fn set_mixed(&self, v: bool) {
        self.update(|c| c.with_mixed(v));
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self::new(RawConfig::default())
    }
}
