//! Error types shared across layers.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

/// Errors raised by a [`Codec`](super::Codec) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The named dictionary could not be found or loaded.
    #[error("unknown dictionary: {0}")]
    UnknownDictionary(String),

    /// An attribute name is not defined by any registered dictionary.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// An attribute value cannot be encoded for its declared type.
    #[error("invalid value for attribute {attribute}: {reason}")]
    InvalidValue {
        /// Attribute name.
        attribute: String,
        /// Why the value was refused.
        reason: String,
    },

    /// The packet bytes do not follow the wire grammar.
    #[error("malformed packet: {0}")]
    Malformed(String),
}

/// A collaborator call that panicked instead of returning an error.
///
/// Panics never cross the client boundary; they are caught at the call
/// site and surfaced as this typed value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{operation} panicked: {message}")]
pub struct CollaboratorPanic {
    /// The collaborator operation that was running.
    pub operation: &'static str,
    /// Panic payload rendered as text.
    pub message: String,
}

/// Run a collaborator call, turning a panic into a [`CollaboratorPanic`].
pub fn catch_panic<T>(
    operation: &'static str,
    f: impl FnOnce() -> T,
) -> Result<T, CollaboratorPanic> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| CollaboratorPanic {
        operation,
        message: panic_message(payload.as_ref()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
