mod client;
mod codec;
mod connection;
mod constants;
pub mod events;
mod heartbeat;
mod params;
mod payloads;
mod reconnect;
mod registry;
mod session;

pub use client::{
    CloseCallback, ErrorCallback, GatewayClient, GatewayClientConfig, OpenCallback, Subscription,
};
pub use codec::PayloadDecoder;
pub use connection::{WebSocketConnector, WebSocketTransport};
pub use constants::{
    DEFAULT_GATEWAY_URL, GatewayOpcode, HEARTBEAT_INTERVAL, MAX_RECONNECT_ATTEMPTS,
    OpcodeFamily, PUBSUB_OPCODE, RECONNECT_DELAY_BASE,
};
pub use heartbeat::HeartbeatManager;
pub use params::{Compression, ConnectParams};
pub use payloads::{DispatchKey, Envelope, Op};
pub use reconnect::{ReconnectPolicy, calculate_backoff_delay};
pub use registry::{
    Listener, ListenerError, ListenerRegistry, ListenerResult, Route, SubscriptionId, deliver,
    route,
};
