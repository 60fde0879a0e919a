//! Transport layer glue.
//!
//! - **Configuration**: [`RawConfig`] and the [`TransportSettings`] holder
//! - **Plain UDP**: [`UdpConn`] and [`UdpDialer`]
//! - **Raw dialing**: [`RawDialer`] for the multiplexer

mod config;
mod dialer;
mod socket;

pub use config::*;
pub use dialer::RawDialer;
pub use socket::*;
