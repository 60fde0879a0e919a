//! Session establishment.
//!
//! - **Validation**: [`validate_addr`] rejects malformed and wildcard targets
//! - **Caches**: [`SessionCaches`] remembers negotiated MSS and raw listeners
//! - **Establishment**: [`SessionEstablisher`] opens the six transport stacks

mod addr;
mod cache;
mod establish;

#[cfg(test)]
pub(crate) mod testing;

pub use addr::{split_host_port, validate_addr};
pub use cache::{ListenerCache, MssCache, SessionCaches, address_key};
pub use establish::{SessionEstablisher, SessionEstablisherBuilder};
