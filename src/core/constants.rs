//! Protocol constants and client defaults.
//!
//! Packet-type codes follow the IANA RADIUS registry (RFC 2865, RFC 2882,
//! RFC 3575).

use std::ops::RangeInclusive;
use std::time::Duration;

// =============================================================================
// PACKET TYPES (RFC 2865 / IANA)
// =============================================================================

/// Access-Request (client -> server).
pub const CODE_ACCESS_REQUEST: u8 = 1;

/// Access-Accept.
pub const CODE_ACCESS_ACCEPT: u8 = 2;

/// Access-Reject.
pub const CODE_ACCESS_REJECT: u8 = 3;

/// Password-Reject (RFC 2882).
pub const CODE_PASSWORD_REJECT: u8 = 9;

/// Access-Challenge.
pub const CODE_ACCESS_CHALLENGE: u8 = 11;

/// Password-Expired (RFC 2882).
pub const CODE_PASSWORD_EXPIRED: u8 = 32;

// =============================================================================
// ATTRIBUTES
// =============================================================================

/// Name of the Reply-Message attribute (RFC 2865, type 18).
pub const REPLY_MESSAGE: &str = "Reply-Message";

/// Name of the built-in RFC 2865 dictionary.
pub const RFC2865_DICTIONARY: &str = "rfc2865";

// =============================================================================
// CLIENT DEFAULTS
// =============================================================================

/// Default authentication port on the server.
pub const DEFAULT_HOST_PORT: u16 = 1812;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2_500);

/// Default number of retries after the first attempt (4 attempts total).
pub const DEFAULT_RETRIES: u32 = 3;

/// Local ports picked when no fixed local port is configured.
pub const EPHEMERAL_PORT_RANGE: RangeInclusive<u16> = 49152..=65535;

// =============================================================================
// WIRE LIMITS (RFC 2865 section 3)
// =============================================================================

/// Maximum RADIUS packet length; larger datagrams are truncated on receive.
pub const MAX_PACKET_SIZE: usize = 4096;
