//! Transport layer: one fresh UDP endpoint per attempt.
//!
//! - **Sockets**: [`AttemptSocket`], bound per attempt and closed on drop
//! - **Ports**: [`ephemeral_port`] picks from 49152..=65535 when no local port is fixed
//! - **Attempts**: [`exchange_once`] races bind/send/receive against the timeout
//! - **Errors**: [`AttemptError`] tags the retryable timeout apart from terminal failures
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Client (retry loop)             │
//! ├─────────────────────────────────────────┤
//! │         Transport Layer                 │  ← This module
//! │   resolve, bind, send, wait once        │
//! ├─────────────────────────────────────────┤
//! │         Codec (decode + verify)         │
//! ├─────────────────────────────────────────┤
//! │              UDP                        │
//! └─────────────────────────────────────────┘
//! ```

mod attempt;
mod error;
mod socket;

pub use attempt::*;
pub use error::*;
pub use socket::*;
