//! Fixed parameters of the session establishment layer.
//!
//! These values are shared with the peers on the other end of the wire and
//! MUST match theirs.

use super::traits::CipherMethod;

// =============================================================================
// ADDRESSES
// =============================================================================

/// Host that is never accepted as a dial or listen target.
pub const WILDCARD_HOST: &str = "0.0.0.0";

// =============================================================================
// MULTIPLEXER
// =============================================================================

/// Stream cipher used between the multiplexer endpoints.
pub const MUX_CIPHER_METHOD: CipherMethod = CipherMethod::Chacha20Ietf;

/// Physical connections opened by the plain-UDP multiplexed dial.
pub const DEFAULT_MUX_CONNECTIONS: usize = 10;

/// Shared secret of the plain-UDP multiplexed variants.
///
/// This is a placeholder that every peer knows. It only exists so that the
/// plain-UDP paths interoperate with each other out of the box; it provides
/// no confidentiality. Deployments that care should use the raw-transport
/// variants, which take the secret from the caller.
pub const DEFAULT_MUX_SECRET: &str = "123";

// =============================================================================
// RAW TRANSPORT DEFAULTS
// =============================================================================

/// DSCP value applied when none is configured.
pub const DEFAULT_DSCP: u8 = 0;
