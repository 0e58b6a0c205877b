//! High-level RADIUS client API.
//!
//! Provides [`RadiusClient<C>`], which turns one logical request into exactly
//! one verified [`Response`] or one terminal [`ClientError`], retrying only on
//! per-attempt timeouts.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::config::{ClientConfig, ClientOptions, ConfigError};
use super::outcome::AuthOutcome;
use crate::core::{
    catch_panic, Attributes, Code, Codec, CodecError, CollaboratorPanic, Request, Response,
};
use crate::transport::{exchange_once, AttemptError, TransportError};

/// Errors that can occur in the RADIUS client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The options were invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A configured dictionary could not be registered.
    #[error("failed to register dictionary {name}: {source}")]
    Dictionary {
        /// Dictionary name as configured.
        name: String,
        /// Codec error.
        #[source]
        source: CodecError,
    },

    /// The request could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[source] CodecError),

    /// Bind, send or receive failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The reply could not be decoded or failed authenticity verification.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Every permitted attempt timed out.
    #[error("timed out after {}ms ({retries} retries)", .timeout.as_millis())]
    Exhausted {
        /// Retries performed after the first attempt.
        retries: u32,
        /// The per-attempt timeout.
        timeout: Duration,
    },

    /// The server answered with a code outside the known outcome set.
    #[error("unrecognized response code: {0}")]
    UnrecognizedCode(Code),

    /// A codec call panicked.
    #[error(transparent)]
    CollaboratorPanic(#[from] CollaboratorPanic),

    /// The retry loop ended without an outcome.
    #[error("error sending request: no attempt was made")]
    NoAttempts,
}

impl ClientError {
    /// Whether the request gave up after repeated timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Exhausted { .. })
    }

    /// Whether the options or dictionaries were rejected at construction.
    pub fn is_config(&self) -> bool {
        matches!(self, ClientError::Config(_) | ClientError::Dictionary { .. })
    }

    /// Whether a reply arrived but could not be trusted or understood.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidResponse(_) | ClientError::UnrecognizedCode(_)
        )
    }
}

impl From<AttemptError> for ClientError {
    fn from(err: AttemptError) -> Self {
        match err {
            AttemptError::TimedOut { timeout } => ClientError::Exhausted {
                retries: 0,
                timeout,
            },
            AttemptError::Transport(err) => ClientError::Transport(err),
            AttemptError::InvalidResponse(reason) => ClientError::InvalidResponse(reason),
            AttemptError::Panic(panic) => ClientError::CollaboratorPanic(panic),
        }
    }
}

/// A RADIUS client.
///
/// Generic over the wire codec `C`. Cheap to clone; clones share the
/// configuration and codec.
///
/// # Example
///
/// ```ignore
/// use radius_client::prelude::*;
///
/// let client = RadiusClient::create(
///     &serde_json::json!({
///         "host": "localhost",
///         "secret": "testing123",
///         "timeout": 2000,
///         "retries": 1,
///         "dictionaries": ["rfc2865"],
///     }),
///     my_codec,
/// )?;
///
/// let response = client
///     .access_request(
///         Attributes::new()
///             .with("User-Name", "alice")
///             .with("User-Password", "hunter2"),
///     )
///     .await?;
///
/// match response.outcome()? {
///     AuthOutcome::Accepted => println!("welcome"),
///     other => println!("denied: {other} {:?}", response.reply_message()),
/// }
/// ```
pub struct RadiusClient<C: Codec> {
    /// Validated configuration, read-only for the client's lifetime.
    config: Arc<ClientConfig>,

    /// Wire codec.
    codec: Arc<C>,
}

impl<C: Codec> Clone for RadiusClient<C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl<C: Codec> RadiusClient<C> {
    /// Create a client from loosely typed options.
    pub fn create(options: &Value, codec: C) -> Result<Self, ClientError> {
        let config = ClientConfig::from_value(options)?;
        Self::with_config(config, codec)
    }

    /// Create a client from typed options.
    pub fn with_options(options: ClientOptions, codec: C) -> Result<Self, ClientError> {
        Self::with_config(options.build()?, codec)
    }

    /// Create a client from a validated configuration.
    ///
    /// Registers every configured dictionary with the codec; the first
    /// failure aborts construction.
    pub fn with_config(config: ClientConfig, codec: C) -> Result<Self, ClientError> {
        for name in config.dictionaries() {
            catch_panic("add_dictionary", || codec.add_dictionary(name))?.map_err(|source| {
                ClientError::Dictionary {
                    name: name.clone(),
                    source,
                }
            })?;
            debug!(dictionary = %name, "dictionary registered");
        }

        Ok(Self {
            config: Arc::new(config),
            codec: Arc::new(codec),
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Send an Access-Request and classify the reply.
    ///
    /// Accepted and rejected outcomes are both returned as a [`Response`];
    /// only an unrecognized code is raised.
    pub async fn access_request(&self, attributes: Attributes) -> Result<Response, ClientError> {
        let response = self.send(Code::ACCESS_REQUEST, attributes).await?;

        match response.outcome()? {
            AuthOutcome::Accepted => {
                info!(identifier = response.identifier, "access accepted");
            }
            outcome => {
                info!(
                    identifier = response.identifier,
                    %outcome,
                    reply_message = response.reply_message().unwrap_or_default(),
                    "access denied"
                );
            }
        }

        Ok(response)
    }

    /// Send a request with the given code and attributes.
    pub async fn send(&self, code: Code, attributes: Attributes) -> Result<Response, ClientError> {
        self.send_request(&Request::new(code, attributes)).await
    }

    /// Encode `request` once and drive attempts until one resolves.
    pub async fn send_request(&self, request: &Request) -> Result<Response, ClientError> {
        let packet = catch_panic("encode", || self.codec.encode(request, self.config.secret()))?
            .map_err(ClientError::Encode)?;
        self.send_packet(&packet).await
    }

    async fn send_packet(&self, packet: &[u8]) -> Result<Response, ClientError> {
        let target = self.config.attempt_target();
        let max_retries = u64::from(self.config.retries());
        let mut tries: u64 = 0;

        while tries <= max_retries {
            let attempt = tries + 1;
            match exchange_once(&target, self.codec.as_ref(), self.config.secret(), packet).await {
                Ok(response) => {
                    debug!(
                        attempt,
                        code = %response.code,
                        identifier = response.identifier,
                        "response verified"
                    );
                    return Ok(response);
                }
                Err(AttemptError::TimedOut { timeout }) => {
                    tries += 1;
                    if tries > max_retries {
                        warn!(
                            host = target.host,
                            retries = max_retries,
                            "no response, retries exhausted"
                        );
                        return Err(ClientError::Exhausted {
                            retries: self.config.retries(),
                            timeout,
                        });
                    }
                    debug!(attempt, "attempt timed out, retrying");
                }
                Err(err) => {
                    debug!(attempt, error = %err, "attempt failed");
                    return Err(err.into());
                }
            }
        }

        Err(ClientError::NoAttempts)
    }
}
