use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, trace, warn};

use super::codec::PayloadDecoder;
use super::connection::{Outbound, OutboundSender, WebSocketConnector};
use super::constants::{HEARTBEAT_INTERVAL, MAX_RECONNECT_ATTEMPTS, RECONNECT_DELAY_BASE};
use super::payloads::{DispatchKey, Envelope};
use super::reconnect::ReconnectPolicy;
use super::registry::{Listener, ListenerResult, SubscriptionId, deliver, route};
use super::session::{CloseOutcome, SessionState};
use crate::domain::{ConnectionState, Frame, GatewayError, TransportConnector, TransportEvent};

pub type OpenCallback = Arc<dyn Fn() + Send + Sync>;
pub type CloseCallback = Arc<dyn Fn() + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&GatewayError) + Send + Sync>;

#[derive(Clone)]
pub struct GatewayClientConfig {
    pub heartbeat_interval: Duration,
    pub reconnect_base_delay: Duration,
    pub max_reconnect_attempts: u32,
    /// Logs every decoded envelope and dispatch at debug level.
    pub debug: bool,
    pub on_open: Option<OpenCallback>,
    pub on_close: Option<CloseCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl Default for GatewayClientConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: HEARTBEAT_INTERVAL,
            reconnect_base_delay: RECONNECT_DELAY_BASE,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            debug: false,
            on_open: None,
            on_close: None,
            on_error: None,
        }
    }
}

impl GatewayClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    #[must_use]
    pub const fn with_reconnect_base_delay(mut self, delay: Duration) -> Self {
        self.reconnect_base_delay = delay;
        self
    }

    #[must_use]
    pub const fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    #[must_use]
    pub const fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    #[must_use]
    pub fn on_open<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_open = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn on_close<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_close = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&GatewayError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(self.reconnect_base_delay, self.max_reconnect_attempts)
    }
}

struct GatewayInner {
    connector: Arc<dyn TransportConnector>,
    config: GatewayClientConfig,
    decoder: PayloadDecoder,
    state: Mutex<SessionState>,
}

/// Handle to one gateway session.
///
/// Clones share the session. Listener callbacks run on the connection task,
/// one envelope at a time, and never under the session lock, so they may call
/// back into the client.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<GatewayInner>,
}

impl GatewayClient {
    #[must_use]
    pub fn new(connector: Arc<dyn TransportConnector>, config: GatewayClientConfig) -> Self {
        let state = SessionState::new(config.heartbeat_interval, config.reconnect_policy());

        Self {
            inner: Arc::new(GatewayInner {
                connector,
                config,
                decoder: PayloadDecoder::new(),
                state: Mutex::new(state),
            }),
        }
    }

    #[must_use]
    pub fn with_websocket(config: GatewayClientConfig) -> Self {
        Self::new(Arc::new(WebSocketConnector::new()), config)
    }

    /// Starts connecting in the background and returns immediately.
    ///
    /// Replaces any current connection and cancels a pending reconnect. The
    /// reconnect attempt counter is left as is; only a successful open
    /// resets it. Failures are reported through `on_error` and retried.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn connect(&self, url: impl Into<String>) {
        self.inner.start_connection(url.into(), None);
    }

    /// Closes the transport, drops all listeners and suppresses reconnection.
    pub fn disconnect(&self) {
        let had_transport = self.inner.state.lock().disconnect();

        if had_transport {
            info!("Disconnected from gateway");
            if let Some(callback) = &self.inner.config.on_close {
                callback();
            }
        }
    }

    /// Queues an envelope. Returns `false`, sending nothing, when not connected.
    pub fn send_message(&self, envelope: Envelope) -> bool {
        let outbound = self.inner.state.lock().outbound.clone();
        let sent = outbound.is_some_and(|outbound| outbound.send(envelope));

        if !sent {
            debug!("Not connected, dropping outbound envelope");
        }
        sent
    }

    /// Registers a listener for an event name or opcode.
    ///
    /// Registrations last until unsubscribed or until the connection closes.
    /// Dropping the returned [`Subscription`] does not unsubscribe.
    pub fn on_message<K, F>(&self, key: K, listener: F) -> Subscription
    where
        K: Into<DispatchKey>,
        F: Fn(&Value) -> ListenerResult + Send + Sync + 'static,
    {
        let key = key.into();
        let listener: Listener = Arc::new(listener);
        let id = self
            .inner
            .state
            .lock()
            .registry
            .subscribe(key.clone(), listener);

        trace!(key = %key, "Listener registered");
        Subscription {
            session: Arc::downgrade(&self.inner),
            key,
            id,
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.state.lock().is_connected()
    }

    #[must_use]
    pub fn status(&self) -> ConnectionState {
        self.inner.state.lock().status
    }

    #[must_use]
    pub fn listener_count(&self, key: impl Into<DispatchKey>) -> usize {
        self.inner.state.lock().registry.listener_count(&key.into())
    }

    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.state.lock().reconnect.attempts()
    }
}

/// Token for one listener registration.
pub struct Subscription {
    session: Weak<GatewayInner>,
    key: DispatchKey,
    id: SubscriptionId,
}

impl Subscription {
    /// Removes the registration. Returns `false` if it was already gone.
    pub fn unsubscribe(&self) -> bool {
        self.session.upgrade().is_some_and(|inner| {
            inner
                .state
                .lock()
                .registry
                .unsubscribe(&self.key, self.id)
        })
    }

    #[must_use]
    pub const fn key(&self) -> &DispatchKey {
        &self.key
    }

    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl GatewayInner {
    /// `scheduled` carries the generation a reconnect timer was armed for.
    fn start_connection(self: &Arc<Self>, url: String, scheduled: Option<u64>) {
        let replaced_transport = {
            let mut state = self.state.lock();

            if let Some(generation) = scheduled {
                if !state.is_current(generation) {
                    trace!(generation, "Stale reconnect timer");
                    return;
                }
                state.pending_reconnect = None;
            } else {
                state.manual_disconnect = false;
            }

            let (generation, replaced_transport) = state.begin_attempt();
            debug!(generation, url = %url, "Opening gateway transport");

            let session = Arc::downgrade(self);
            state.connection_task = Some(tokio::spawn(run_connection(session, url, generation)));
            replaced_transport
        };

        if replaced_transport {
            info!("Gateway connection replaced");
            if let Some(callback) = &self.config.on_close {
                callback();
            }
        }
    }

    fn handle_open(&self, generation: u64, outbound: OutboundSender) -> bool {
        {
            let mut state = self.state.lock();
            if !state.is_current(generation) {
                return false;
            }
            state.mark_open(outbound);
        }

        info!("Gateway connected");
        if let Some(callback) = &self.config.on_open {
            callback();
        }
        true
    }

    fn handle_frame(&self, generation: u64, frame: &Frame) {
        let envelope = match self.decoder.decode(frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable frame");
                return;
            }
        };

        if self.config.debug {
            debug!(op = %envelope.op, t = ?envelope.t, "Received envelope");
        }

        let Some(route) = route(envelope) else {
            return;
        };

        let listeners = {
            let state = self.state.lock();
            if !state.is_current(generation) {
                return;
            }
            state.registry.listeners(&route.key)
        };

        if listeners.is_empty() {
            trace!(key = %route.key, "No listeners");
            return;
        }

        let delivered = deliver(&route.key, &listeners, &route.payload);
        if self.config.debug {
            debug!(
                key = %route.key,
                listeners = listeners.len(),
                delivered,
                "Dispatched envelope"
            );
        }
    }

    fn handle_error(&self, generation: u64, error: &GatewayError) {
        if !self.state.lock().is_current(generation) {
            return;
        }

        warn!(error = %error, "Gateway transport error");
        if let Some(callback) = &self.config.on_error {
            callback(error);
        }
    }

    fn handle_close(self: &Arc<Self>, url: String, generation: u64) {
        let had_transport = {
            let mut state = self.state.lock();
            if !state.is_current(generation) {
                trace!(generation, "Ignoring close of superseded connection");
                return;
            }

            state.connection_task = None;
            let had_transport = state.teardown();

            match state.next_after_close() {
                CloseOutcome::Retry { delay, .. } => {
                    let session = Arc::downgrade(self);
                    state.pending_reconnect = Some(tokio::spawn(async move {
                        sleep(delay).await;
                        if let Some(inner) = session.upgrade() {
                            inner.start_connection(url, Some(generation));
                        }
                    }));
                }
                CloseOutcome::Manual | CloseOutcome::GaveUp => {}
            }

            had_transport
        };

        if had_transport {
            info!("Gateway connection closed");
            if let Some(callback) = &self.config.on_close {
                callback();
            }
        }
    }
}

impl Drop for GatewayInner {
    fn drop(&mut self) {
        self.state.get_mut().shutdown();
    }
}

async fn run_connection(session: Weak<GatewayInner>, url: String, generation: u64) {
    let Some(connector) = session.upgrade().map(|inner| Arc::clone(&inner.connector)) else {
        return;
    };

    let result = connector.connect(&url).await;

    let Some(inner) = session.upgrade() else {
        return;
    };

    let mut transport = match result {
        Ok(transport) => transport,
        Err(e) => {
            warn!(
                error = %e,
                recoverable = e.is_recoverable(),
                "Failed to open gateway transport"
            );
            inner.handle_error(generation, &e);
            inner.handle_close(url, generation);
            return;
        }
    };

    let (outbound, mut outbound_rx) = OutboundSender::channel();
    if !inner.handle_open(generation, outbound.clone()) {
        let _ = transport.close().await;
        return;
    }
    drop(inner);

    loop {
        tokio::select! {
            event = transport.next_event() => {
                let Some(inner) = session.upgrade() else {
                    break;
                };

                match event {
                    Some(TransportEvent::Message(frame)) => inner.handle_frame(generation, &frame),
                    Some(TransportEvent::Error(e)) => inner.handle_error(generation, &e),
                    Some(TransportEvent::Closed { code, reason }) => {
                        debug!(code, reason = %reason, "Transport closed");
                        break;
                    }
                    None => {
                        debug!("Transport stream ended");
                        break;
                    }
                }
            }
            command = outbound_rx.recv() => {
                match command {
                    Some(Outbound::Envelope(envelope)) => match serde_json::to_string(&envelope) {
                        Ok(json) => {
                            if let Err(e) = transport.send(json).await {
                                warn!(error = %e, "Failed to send envelope");
                            }
                        }
                        Err(e) => warn!(error = %e, "Failed to serialize envelope"),
                    },
                    Some(Outbound::Close) | None => {
                        if let Err(e) = transport.close().await {
                            debug!(error = %e, "Error while closing transport");
                        }
                        break;
                    }
                }
            }
        }
    }

    outbound.mark_closed();
    if let Some(inner) = session.upgrade() {
        inner.handle_close(url, generation);
    }
}
