//! # kcpraw
//!
//! Establishes loss-tolerant FEC packet sessions over obfuscated transports.
//! Three layers are composed per connection:
//!
//! - **Raw transport**: disguises traffic (optionally as HTTP) over TCP, with
//!   DSCP tagging and RST suppression
//! - **Multiplexer** (optional): spreads one logical connection over several
//!   physical ones under a stream cipher
//! - **FEC session**: Reed-Solomon erasure coding and encryption on top
//!
//! This crate decides which of them to invoke and glues their results
//! together. The layers themselves are supplied by the caller through the
//! traits in [`core`].
//!
//! ## Feature Flags
//!
//! - `config` (default): TOML loading and saving of [`RawConfig`]
//!
//! ## Modules
//!
//! - [`core`]: Collaborator traits, constants, and error types
//! - [`transport`]: Raw transport configuration, plain UDP sockets, dialers
//! - [`session`]: Address validation, caches, and the session establisher
//!
//! ## Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use kcpraw::prelude::*;
//!
//! let establisher = SessionEstablisher::builder(raw, mux, engine)
//!     .config(RawConfig::default().with_host("www.example.com"))
//!     .build();
//!
//! let session = establisher
//!     .dial("10.0.0.1:1234", Arc::new(NoneBlockCrypt), 10, 3)
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod core;
pub mod session;
pub mod transport;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::constants::*;
    pub use crate::core::{
        AddrError, BlockCrypt, CipherMethod, Dialer, Multiplexer, NoneBlockCrypt, PacketConn,
        RawConn, RawListener, RawTransport, SessionEngine, SessionError, SharedConn, Stage,
    };
    pub use crate::session::{SessionCaches, SessionEstablisher, validate_addr};
    pub use crate::transport::{RawConfig, TransportSettings, UdpConn, UdpDialer};
}

pub use crate::core::{Result, SessionError};
pub use session::{SessionCaches, SessionEstablisher};
pub use transport::RawConfig;
