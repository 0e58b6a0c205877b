//! Transport layer error types.
//!
//! [`AttemptError`] is the tagged outcome of a failed attempt. Only
//! [`AttemptError::TimedOut`] is retryable; everything else ends the request.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::core::CollaboratorPanic;

/// Socket-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Host name lookup failed.
    #[error("failed to resolve {host}:{port}: {source}")]
    Resolve {
        /// Remote host as configured.
        host: String,
        /// Remote port.
        port: u16,
        /// Underlying resolver error.
        #[source]
        source: io::Error,
    },

    /// Lookup succeeded but returned no address.
    #[error("no address found for {host}:{port}")]
    NoAddress {
        /// Remote host as configured.
        host: String,
        /// Remote port.
        port: u16,
    },

    /// The local endpoint could not be bound.
    #[error("failed to bind local port {port}: {source}")]
    Bind {
        /// Local port that was requested.
        port: u16,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// The request datagram could not be sent.
    #[error("failed to send to {remote}: {source}")]
    Send {
        /// Destination address.
        remote: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// The socket failed while waiting for a reply.
    #[error("failed to receive: {0}")]
    Receive(#[source] io::Error),
}

/// Why a single attempt did not produce a response.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// No reply arrived within the attempt window.
    #[error("timed out after {}ms", .timeout.as_millis())]
    TimedOut {
        /// The per-attempt timeout that elapsed.
        timeout: Duration,
    },

    /// Bind, send or receive failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The reply could not be decoded or failed authenticity verification.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The codec panicked while handling the reply.
    #[error(transparent)]
    Panic(#[from] CollaboratorPanic),
}

impl AttemptError {
    /// Whether another attempt may be made.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AttemptError::TimedOut { .. })
    }
}

/// Result type for attempt operations.
pub type AttemptResult<T> = Result<T, AttemptError>;
