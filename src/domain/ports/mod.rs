mod transport_port;

pub use transport_port::{Frame, Transport, TransportConnector, TransportEvent};

#[cfg(test)]
pub mod mocks {
    pub use super::transport_port::mock::{
        ConnectAttempt, MockConnector, MockTransportHandle, mock_transport,
    };
}
