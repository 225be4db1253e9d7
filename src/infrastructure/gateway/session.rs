use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::connection::OutboundSender;
use super::heartbeat::HeartbeatManager;
use super::reconnect::ReconnectPolicy;
use super::registry::ListenerRegistry;
use crate::domain::ConnectionState;

/// What a close turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Closed by the caller; no retry.
    Manual,
    /// Retry scheduled after `delay`.
    Retry { attempt: u32, delay: Duration },
    /// Retry ceiling reached.
    GaveUp,
}

/// Mutable state of one gateway session, guarded by a single lock.
///
/// `generation` identifies the current connection attempt. Work spawned for
/// an older generation finds a mismatch and leaves the state untouched.
pub struct SessionState {
    pub status: ConnectionState,
    pub outbound: Option<OutboundSender>,
    pub registry: ListenerRegistry,
    pub heartbeat: HeartbeatManager,
    pub reconnect: ReconnectPolicy,
    pub connection_task: Option<JoinHandle<()>>,
    pub pending_reconnect: Option<JoinHandle<()>>,
    pub generation: u64,
    pub manual_disconnect: bool,
}

impl SessionState {
    #[must_use]
    pub fn new(heartbeat_interval: Duration, reconnect: ReconnectPolicy) -> Self {
        Self {
            status: ConnectionState::Disconnected,
            outbound: None,
            registry: ListenerRegistry::new(),
            heartbeat: HeartbeatManager::new(heartbeat_interval),
            reconnect,
            connection_task: None,
            pending_reconnect: None,
            generation: 0,
            manual_disconnect: false,
        }
    }

    #[must_use]
    pub const fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.outbound.as_ref().is_some_and(OutboundSender::is_open)
    }

    /// Starts a new generation, releasing whatever the previous one held.
    ///
    /// A transport that is still open is asked to close and torn down here,
    /// since its own close will arrive as stale; a task still connecting is
    /// aborted. Returns the new generation and whether a transport was open.
    pub fn begin_attempt(&mut self) -> (u64, bool) {
        self.cancel_pending_reconnect();
        self.heartbeat.stop();

        let task = self.connection_task.take();
        let replaced_transport = if let Some(outbound) = self.outbound.take() {
            outbound.close();
            self.registry.clear();
            true
        } else {
            if let Some(task) = task {
                task.abort();
            }
            false
        };

        self.generation += 1;
        self.status = ConnectionState::Connecting;
        (self.generation, replaced_transport)
    }

    pub fn cancel_pending_reconnect(&mut self) -> bool {
        self.pending_reconnect.take().is_some_and(|task| {
            task.abort();
            debug!("Pending reconnect cancelled");
            true
        })
    }

    pub fn mark_open(&mut self, outbound: OutboundSender) {
        outbound.mark_open();
        self.reconnect.reset();
        self.heartbeat.start(outbound.clone());
        self.outbound = Some(outbound);
        self.status = ConnectionState::Open;
    }

    /// Close teardown: stops the heartbeat, drops every listener and releases
    /// the transport handle. Returns whether a transport had been open.
    pub fn teardown(&mut self) -> bool {
        self.heartbeat.stop();
        self.registry.clear();
        self.status = ConnectionState::Closed;

        self.outbound.take().is_some_and(|outbound| {
            outbound.mark_closed();
            true
        })
    }

    /// Decides what follows a close. The caller schedules the retry.
    pub fn next_after_close(&mut self) -> CloseOutcome {
        if self.manual_disconnect {
            self.status = ConnectionState::Disconnected;
            return CloseOutcome::Manual;
        }

        match self.reconnect.next_delay() {
            Some(delay) => {
                let attempt = self.reconnect.attempts();
                self.status = ConnectionState::Reconnecting { attempt };
                info!(
                    attempt,
                    delay_ms = delay.as_millis(),
                    "Reconnecting to gateway"
                );
                CloseOutcome::Retry { attempt, delay }
            }
            None => {
                error!(
                    attempts = self.reconnect.attempts(),
                    "Max reconnection attempts exceeded"
                );
                self.status = ConnectionState::Closed;
                CloseOutcome::GaveUp
            }
        }
    }

    /// Explicit disconnect. Returns whether a transport had been open.
    pub fn disconnect(&mut self) -> bool {
        self.manual_disconnect = true;
        self.cancel_pending_reconnect();

        let task = self.connection_task.take();
        let had_transport = if let Some(outbound) = self.outbound.take() {
            outbound.close();
            true
        } else {
            if let Some(task) = task {
                task.abort();
            }
            false
        };

        self.generation += 1;
        self.heartbeat.stop();
        self.registry.clear();
        self.status = ConnectionState::Disconnected;
        had_transport
    }

    /// Aborts every task owned by the session.
    pub fn shutdown(&mut self) {
        self.cancel_pending_reconnect();
        self.heartbeat.stop();
        if let Some(outbound) = self.outbound.take() {
            outbound.close();
        }
        if let Some(task) = self.connection_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::gateway::connection::Outbound;
    use crate::infrastructure::gateway::payloads::DispatchKey;
    use crate::infrastructure::gateway::registry::ListenerResult;
    use serde_json::Value;
    use std::sync::Arc;

    fn noop(_: &Value) -> ListenerResult {
        Ok(())
    }

    fn state(max_attempts: u32) -> SessionState {
        SessionState::new(
            Duration::from_secs(30),
            ReconnectPolicy::new(Duration::from_millis(1000), max_attempts),
        )
    }

    #[tokio::test]
    async fn test_open_resets_attempts() {
        let mut state = state(5);
        state.reconnect.next_delay();
        state.reconnect.next_delay();

        state.begin_attempt();
        let (outbound, _rx) = OutboundSender::channel();
        state.mark_open(outbound);

        assert_eq!(state.reconnect.attempts(), 0);
        assert!(state.status.is_open());
        assert!(state.is_connected());
        assert!(state.heartbeat.is_running());
    }

    #[tokio::test]
    async fn test_teardown_clears_listeners() {
        let mut state = state(5);
        state
            .registry
            .subscribe(DispatchKey::from("message_create"), Arc::new(noop));
        let (outbound, _rx) = OutboundSender::channel();
        state.mark_open(outbound.clone());

        assert!(state.teardown());

        assert!(state.registry.is_empty());
        assert!(!state.heartbeat.is_running());
        assert!(!outbound.is_open());
        assert!(!state.is_connected());
    }

    #[test]
    fn test_close_schedules_until_ceiling() {
        let mut state = state(2);

        assert_eq!(
            state.next_after_close(),
            CloseOutcome::Retry {
                attempt: 1,
                delay: Duration::from_millis(1000)
            }
        );
        assert_eq!(
            state.next_after_close(),
            CloseOutcome::Retry {
                attempt: 2,
                delay: Duration::from_millis(2000)
            }
        );
        assert_eq!(state.next_after_close(), CloseOutcome::GaveUp);
        assert_eq!(state.status, ConnectionState::Closed);
    }

    #[test]
    fn test_manual_close_never_retries() {
        let mut state = state(5);
        state.manual_disconnect = true;

        assert_eq!(state.next_after_close(), CloseOutcome::Manual);
        assert_eq!(state.reconnect.attempts(), 0);
        assert_eq!(state.status, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_closes_transport() {
        let mut state = state(5);
        let (generation, _) = state.begin_attempt();
        let (outbound, mut rx) = OutboundSender::channel();
        state.mark_open(outbound);

        assert!(state.disconnect());

        assert!(!state.is_current(generation));
        assert_eq!(state.status, ConnectionState::Disconnected);
        assert!(matches!(rx.try_recv(), Ok(Outbound::Close)));
        assert!(!state.disconnect());
    }

    #[tokio::test]
    async fn test_begin_attempt_cancels_pending_reconnect() {
        let mut state = state(5);
        state.pending_reconnect = Some(tokio::spawn(std::future::pending()));

        let (first, _) = state.begin_attempt();
        let (second, _) = state.begin_attempt();

        assert!(state.pending_reconnect.is_none());
        assert_eq!(second, first + 1);
        assert_eq!(state.status, ConnectionState::Connecting);
    }

    #[tokio::test]
    async fn test_replacing_open_transport_tears_it_down() {
        let mut state = state(5);
        state
            .registry
            .subscribe(DispatchKey::from("message_create"), Arc::new(noop));
        let (_, replaced) = state.begin_attempt();
        assert!(!replaced);
        assert_eq!(
            state
                .registry
                .listener_count(&DispatchKey::from("message_create")),
            1
        );

        let (outbound, mut rx) = OutboundSender::channel();
        state.mark_open(outbound.clone());

        let (_, replaced) = state.begin_attempt();

        assert!(replaced);
        assert!(state.registry.is_empty());
        assert!(!state.heartbeat.is_running());
        assert!(!outbound.is_open());
        assert!(matches!(rx.try_recv(), Ok(Outbound::Close)));
    }
}
