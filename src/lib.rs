//! Gatewire - client engine for a real-time chat gateway.
//!
//! Maintains one long-lived connection to a gateway, decodes its text and
//! zlib-compressed frames, routes each envelope to the listeners registered
//! for its event name or opcode, keeps the connection alive with heartbeats
//! and reconnects with exponential backoff.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Domain layer containing connection state, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing the gateway engine and its adapters.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "gatewire";
