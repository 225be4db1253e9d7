//! Domain layer with connection state, errors, and port definitions.

/// Connection state definitions.
pub mod connection;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use connection::ConnectionState;
pub use errors::{GatewayError, GatewayResult};
pub use ports::{Frame, Transport, TransportConnector, TransportEvent};
