//! Domain error types.

mod gateway_error;

pub use gateway_error::{GatewayError, GatewayResult};
