//! Infrastructure layer with the gateway engine and its adapters.

/// Application configuration.
pub mod config;
/// Real-time gateway client.
pub mod gateway;

pub use config::{AppConfig, CliArgs, GatewayConfig, LogLevel, StorageManager};
pub use gateway::{
    ConnectParams, DispatchKey, Envelope, GatewayClient, GatewayClientConfig, GatewayOpcode,
    Subscription,
};
