//! RADIUS client library.
//!
//! High-level API: configuration, retry orchestration and outcome
//! classification.

#[allow(clippy::module_inception)]
mod client;
mod config;
mod outcome;

pub use client::*;
pub use config::*;
pub use outcome::*;
