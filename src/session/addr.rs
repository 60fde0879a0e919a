//! Address validation performed before any socket is opened.

use crate::core::AddrError;
use crate::core::constants::WILDCARD_HOST;

/// Split `"host:port"`, `"[v6]:port"` into host and port.
///
/// The port is not parsed; an empty port is accepted.
pub fn split_host_port(addr: &str) -> Result<(&str, &str), AddrError> {
    let colon = addr.rfind(':').ok_or(AddrError::MissingPort)?;

    let host = if let Some(rest) = addr.strip_prefix('[') {
        let end = rest.find(']').ok_or(AddrError::MissingBracket)? + 1;
        match addr.as_bytes().get(end + 1) {
            None => return Err(AddrError::MissingPort),
            Some(b':') if end + 1 == colon => {}
            Some(b':') => return Err(AddrError::TooManyColons),
            Some(_) => return Err(AddrError::MissingPort),
        }
        &addr[1..end]
    } else {
        let host = &addr[..colon];
        if host.contains(':') {
            return Err(AddrError::TooManyColons);
        }
        host
    };

    let port = &addr[colon + 1..];
    if host.contains(['[', ']']) || port.contains(['[', ']']) {
        return Err(AddrError::MissingBracket);
    }
    Ok((host, port))
}

/// Reject addresses the raw transport cannot route: malformed, empty host,
/// or the `0.0.0.0` wildcard.
pub fn validate_addr(addr: &str) -> Result<(), AddrError> {
    let (host, _) = split_host_port(addr)?;
    if host.is_empty() {
        return Err(AddrError::EmptyHost);
    }
    if host == WILDCARD_HOST {
        return Err(AddrError::WildcardHost);
    }
    Ok(())
}
