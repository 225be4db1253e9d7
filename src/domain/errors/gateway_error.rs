//! Gateway error types.

use thiserror::Error;

/// Result alias used across the gateway engine.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum GatewayError {
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("websocket error: {message}")]
    WebSocket { message: String },

    #[error("compression error: {message}")]
    CompressionError { message: String },

    #[error("serialization error: {message}")]
    SerializationError { message: String },

    #[error("timeout waiting for {operation}")]
    Timeout { operation: String },

    #[error("invalid gateway url: {message}")]
    InvalidUrl { message: String },

    #[error("not connected to gateway")]
    NotConnected,
}

impl GatewayError {
    /// Creates a connection failure.
    #[must_use]
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Creates a websocket transport error.
    #[must_use]
    pub fn websocket(message: impl Into<String>) -> Self {
        Self::WebSocket {
            message: message.into(),
        }
    }

    /// Creates a decompression error.
    #[must_use]
    pub fn compression(message: impl Into<String>) -> Self {
        Self::CompressionError {
            message: message.into(),
        }
    }

    /// Creates a (de)serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Creates an invalid url error.
    #[must_use]
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }

    /// Decode failures only drop the offending frame.
    #[must_use]
    pub const fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::CompressionError { .. } | Self::SerializationError { .. }
        )
    }

    /// Transient transport failures, as opposed to configuration mistakes.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::WebSocket { .. } | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_recoverability() {
        assert!(GatewayError::connection_failed("test").is_recoverable());
        assert!(GatewayError::timeout("connection").is_recoverable());
        assert!(!GatewayError::invalid_url("nope").is_recoverable());
        assert!(!GatewayError::NotConnected.is_recoverable());
    }

    #[test]
    fn test_decode_errors() {
        assert!(GatewayError::compression("bad").is_decode_error());
        assert!(GatewayError::serialization("bad").is_decode_error());
        assert!(!GatewayError::websocket("reset").is_decode_error());
    }
}
