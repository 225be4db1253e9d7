//! Transport port definition.
//!
//! The gateway engine never talks to a socket directly: it asks a
//! [`TransportConnector`] for a [`Transport`] and then drives it by polling
//! lifecycle events (message, error, close) and pushing text frames out.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::{GatewayError, GatewayResult};

/// One raw inbound frame as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text frame.
    Text(String),
    /// Binary frame (zlib-compressed document).
    Binary(Bytes),
}

/// Lifecycle event reported by an open transport.
#[derive(Debug)]
pub enum TransportEvent {
    /// A frame arrived.
    Message(Frame),
    /// Non-terminal error; a fatal error is followed by `Closed`.
    Error(GatewayError),
    /// The transport closed.
    Closed {
        /// Close code.
        code: u16,
        /// Close reason.
        reason: String,
    },
}

/// Full-duplex connection to a gateway.
#[async_trait]
pub trait Transport: Send {
    /// Sends a text frame.
    async fn send(&mut self, text: String) -> GatewayResult<()>;

    /// Waits for the next lifecycle event. `None` means the stream ended.
    async fn next_event(&mut self) -> Option<TransportEvent>;

    /// Closes the transport.
    async fn close(&mut self) -> GatewayResult<()>;
}

/// Factory opening transports to a gateway url.
#[async_trait]
pub trait TransportConnector: Send + Sync {
    /// Opens a new transport. Resolving to `Ok` is the "open" event.
    async fn connect(&self, url: &str) -> GatewayResult<Box<dyn Transport>>;
}
