//! The codec seam.
//!
//! The client never touches the byte-level packet grammar. Everything wire
//! related goes through a [`Codec`]: attribute encoding, authenticator
//! computation, dictionary resolution.

use super::error::CodecError;
use super::packet::{Request, Response};
use super::secret::Secret;

/// Wire codec consumed by the client.
///
/// # Requirements
///
/// - `encode` computes all authenticity material (Request Authenticator,
///   Message-Authenticator) once; the client resends the same bytes on every
///   attempt.
/// - `verify_response` MUST bind `response` to `request` and `secret`; a
///   response that fails it is never returned to a caller.
/// - `add_dictionary` is called only while a client is being created, from a
///   single task. Implementations may keep the registry process-wide.
///
/// # Example
///
/// ```ignore
/// struct MyCodec { /* dictionary registry */ }
///
/// impl Codec for MyCodec {
///     fn add_dictionary(&self, name: &str) -> Result<(), CodecError> { /* ... */ }
///     fn encode(&self, request: &Request, secret: &Secret) -> Result<Vec<u8>, CodecError> { /* ... */ }
///     fn decode(&self, packet: &[u8], secret: &Secret) -> Result<Response, CodecError> { /* ... */ }
///     fn verify_response(&self, response: &[u8], request: &[u8], secret: &Secret) -> bool { /* ... */ }
/// }
/// ```
pub trait Codec: Send + Sync + 'static {
    /// Register a dictionary by name so its attribute names resolve.
    fn add_dictionary(&self, name: &str) -> Result<(), CodecError>;

    /// Encode a request into transmittable bytes.
    fn encode(&self, request: &Request, secret: &Secret) -> Result<Vec<u8>, CodecError>;

    /// Decode received bytes into a response.
    fn decode(&self, packet: &[u8], secret: &Secret) -> Result<Response, CodecError>;

    /// Check a response's authenticator against the original request bytes.
    fn verify_response(&self, response: &[u8], request: &[u8], secret: &Secret) -> bool;
}

impl<C: Codec> Codec for std::sync::Arc<C> {
    fn add_dictionary(&self, name: &str) -> Result<(), CodecError> {
        (**self).add_dictionary(name)
    }

    fn encode(&self, request: &Request, secret: &Secret) -> Result<Vec<u8>, CodecError> {
        (**self).encode(request, secret)
    }

    fn decode(&self, packet: &[u8], secret: &Secret) -> Result<Response, CodecError> {
        (**self).decode(packet, secret)
    }

    fn verify_response(&self, response: &[u8], request: &[u8], secret: &Secret) -> bool {
        (**self).verify_response(response, request, secret)
    }
}
