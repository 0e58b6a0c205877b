//! # radius-client
//!
//! An async RADIUS client over UDP. Each logical request produces exactly one
//! verified response or one terminal error:
//!
//! - **One endpoint per attempt**: every attempt binds a fresh local socket
//!   (ephemeral port unless one is pinned) and closes it before reporting
//! - **Bounded retry**: only a per-attempt timeout is retried, up to
//!   `retries` times, resending the same encoded bytes
//! - **Authenticity gate**: a reply that fails verification against the
//!   original request is an error, never a response
//! - **Pluggable wire format**: packet encoding, decoding and verification
//!   sit behind the [`Codec`](crate::core::Codec) trait
//!
//! ## Feature Flags
//!
//! - `transport` (default): Per-attempt UDP exchange
//! - `client` (default): Configuration, retry loop, outcome classification
//!
//! ## Modules
//!
//! - [`core`]: Constants, errors, packet model, secret, codec trait (always included)
//! - [`transport`]: Single-attempt transport (requires `transport` feature)
//! - [`client`]: High-level client (requires `client` feature)
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use radius_client::prelude::*;
//!
//! let client = RadiusClient::with_options(
//!     ClientOptions::new("localhost", "testing123")
//!         .timeout(std::time::Duration::from_secs(2))
//!         .retries(1)
//!         .dictionary("rfc2865"),
//!     my_codec,
//! )?;
//!
//! let response = client
//!     .access_request(
//!         Attributes::new()
//!             .with("User-Name", "nfa-user")
//!             .with("User-Password", "Trewq54321"),
//!     )
//!     .await?;
//!
//! if response.outcome()?.is_accepted() {
//!     // ...
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Transport layer (feature-gated)
#[cfg(feature = "transport")]
#[cfg_attr(docsrs, doc(cfg(feature = "transport")))]
pub mod transport;

// Client API (feature-gated)
#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub mod client;

#[cfg(all(test, feature = "transport"))]
mod test_support;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;

    #[cfg(feature = "transport")]
    pub use crate::transport::{AttemptError, TransportError};

    #[cfg(feature = "client")]
    pub use crate::client::{
        AuthOutcome, ClientConfig, ClientError, ClientOptions, ConfigError, ConfigIssue,
        RadiusClient,
    };
}

// Re-export commonly used items at crate root
pub use crate::core::{Attributes, AttributeValue, Code, Codec, CodecError, Request, Response, Secret};

#[cfg(feature = "client")]
pub use client::{AuthOutcome, ClientError, ClientOptions, RadiusClient};
