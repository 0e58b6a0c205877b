//! One send-then-wait-once cycle.
//!
//! ```text
//!   start ──► resolve ──► bind ──► send ──► recv one datagram ──► close ──► decode + verify
//!     │                                                                          │
//!     └──────────────── deadline (timeout) ── drops the exchange ───────────────┘
//! ```
//!
//! The exchange future owns its [`AttemptSocket`]. Whichever of the exchange
//! or the deadline finishes first decides the outcome; the loser is dropped
//! together with the socket before [`exchange_once`] returns.

use std::time::Duration;

use tracing::{debug, trace};

use super::error::{AttemptError, AttemptResult, TransportError};
use super::socket::{ephemeral_port, resolve, AttemptSocket};
use crate::core::{catch_panic, Codec, Response, Secret};

/// Where and how long a single attempt runs.
#[derive(Debug, Clone, Copy)]
pub struct AttemptTarget<'a> {
    /// Remote host name or address literal.
    pub host: &'a str,
    /// Remote port.
    pub port: u16,
    /// Fixed local port, or `None` for a fresh ephemeral port.
    pub local_port: Option<u16>,
    /// Deadline for the whole attempt, from resolution to reply.
    pub timeout: Duration,
}

/// Run one attempt: send `packet` and wait for a single verified reply.
pub async fn exchange_once<C: Codec>(
    target: &AttemptTarget<'_>,
    codec: &C,
    secret: &Secret,
    packet: &[u8],
) -> AttemptResult<Response> {
    let timeout = target.timeout;

    tokio::select! {
        biased;
        result = exchange(target, codec, secret, packet) => result,
        () = tokio::time::sleep(timeout) => {
            debug!(host = target.host, timeout_ms = timeout.as_millis() as u64, "attempt timed out");
            Err(AttemptError::TimedOut { timeout })
        }
    }
}

async fn exchange<C: Codec>(
    target: &AttemptTarget<'_>,
    codec: &C,
    secret: &Secret,
    packet: &[u8],
) -> AttemptResult<Response> {
    let remote = resolve(target.host, target.port).await?;
    let local_port = target.local_port.unwrap_or_else(ephemeral_port);

    let mut socket = AttemptSocket::bind_for(remote, local_port)
        .await
        .map_err(|source| TransportError::Bind {
            port: local_port,
            source,
        })?;

    socket
        .send_to(packet, remote)
        .await
        .map_err(|source| TransportError::Send { remote, source })?;
    debug!(
        local = %socket.local_addr(),
        %remote,
        bytes = packet.len(),
        "request sent"
    );

    let (datagram, from) = socket.recv_from().await.map_err(TransportError::Receive)?;
    let datagram = datagram.to_vec();
    socket.close();
    trace!(%from, bytes = datagram.len(), "datagram received");

    authenticate(codec, secret, &datagram, packet)
}

/// Decode a reply, then bind it to the request that produced it.
fn authenticate<C: Codec>(
    codec: &C,
    secret: &Secret,
    datagram: &[u8],
    request: &[u8],
) -> AttemptResult<Response> {
    let response = catch_panic("decode", || codec.decode(datagram, secret))?
        .map_err(|err| AttemptError::InvalidResponse(err.to_string()))?;

    let authentic = catch_panic("verify_response", || {
        codec.verify_response(datagram, request, secret)
    })?;
    if !authentic {
        return Err(AttemptError::InvalidResponse(
            "response authenticator mismatch".to_string(),
        ));
    }

    Ok(response)
}
