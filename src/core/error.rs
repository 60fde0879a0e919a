//! Error types for session establishment.

use std::io;

use thiserror::Error;

/// Reasons an address string is rejected before any socket is opened.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddrError {
    /// No `:port` separator was found.
    #[error("missing port in address")]
    MissingPort,

    /// An unbracketed host contains a colon.
    #[error("too many colons in address")]
    TooManyColons,

    /// A `[` without its matching `]`, or trailing text after `]`.
    #[error("missing ']' in address")]
    MissingBracket,

    /// The host part is empty, e.g. `":8080"`.
    #[error("host is empty, the address must be ip:port")]
    EmptyHost,

    /// The host part is the all-zeros wildcard.
    #[error("host 0.0.0.0 cannot be used as a session address")]
    WildcardHost,
}

/// The establishment stage that produced a [`SessionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Address validation.
    Validation,
    /// Raw or plain UDP transport.
    Transport,
    /// Multiplexer.
    Multiplex,
    /// FEC session wrapping.
    SessionWrap,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Validation => "validation",
            Stage::Transport => "transport",
            Stage::Multiplex => "multiplex",
            Stage::SessionWrap => "session-wrap",
        };
        f.write_str(name)
    }
}

/// Errors returned by the dial and listen entry points.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The address failed validation.
    #[error("invalid address {addr:?}: {source}")]
    InvalidAddress {
        /// Address as supplied by the caller.
        addr: String,
        /// Why it was rejected.
        #[source]
        source: AddrError,
    },

    /// The raw or plain UDP transport could not connect.
    #[error("transport dial to {addr} failed: {source}")]
    TransportDial {
        /// Remote address.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The raw or plain UDP transport could not bind.
    #[error("transport listen on {addr} failed: {source}")]
    TransportListen {
        /// Local address.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The multiplexer could not assemble its logical connection or listener.
    #[error("multiplexer failed for {addr}: {source}")]
    Multiplex {
        /// Address the multiplexer was serving.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The FEC session engine rejected the opened connection or listener.
    #[error("session wrap for {addr} failed: {source}")]
    SessionWrap {
        /// Address of the wrapped connection or listener.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl SessionError {
    /// Stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            SessionError::InvalidAddress { .. } => Stage::Validation,
            SessionError::TransportDial { .. } | SessionError::TransportListen { .. } => {
                Stage::Transport
            }
            SessionError::Multiplex { .. } => Stage::Multiplex,
            SessionError::SessionWrap { .. } => Stage::SessionWrap,
        }
    }

    /// Address the failing call was made with.
    pub fn addr(&self) -> &str {
        match self {
            SessionError::InvalidAddress { addr, .. }
            | SessionError::TransportDial { addr, .. }
            | SessionError::TransportListen { addr, .. }
            | SessionError::Multiplex { addr, .. }
            | SessionError::SessionWrap { addr, .. } => addr,
        }
    }
}

/// Errors loading or saving a configuration file.
#[cfg(feature = "config")]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid TOML for this configuration.
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type of the establishment entry points.
pub type Result<T> = std::result::Result<T, SessionError>;
