//! Core types shared by every layer: constants, errors, the packet model,
//! the shared secret and the [`Codec`] seam.
//!
//! This module has no transport dependencies.

mod constants;
mod error;
mod packet;
mod secret;
mod traits;

pub use constants::*;
pub use error::*;
pub use packet::*;
pub use secret::*;
pub use traits::*;
