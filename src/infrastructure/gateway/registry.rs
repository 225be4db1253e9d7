use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde_json::Value;
use tracing::{trace, warn};

use super::constants::PUBSUB_EVENT_TYPE_FIELD;
use super::payloads::{DispatchKey, Envelope, Op};

pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;
pub type ListenerResult = Result<(), ListenerError>;
pub type Listener = Arc<dyn Fn(&Value) -> ListenerResult + Send + Sync>;

/// Opaque token identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Event key to ordered listeners. Insertion order is invocation order.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: HashMap<DispatchKey, Vec<(SubscriptionId, Listener)>>,
    next_id: u64,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener. Every call yields a distinct id, even for the same `Arc`.
    pub fn subscribe(&mut self, key: DispatchKey, listener: Listener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.entry(key).or_default().push((id, listener));
        id
    }

    /// Removes one registration. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, key: &DispatchKey, id: SubscriptionId) -> bool {
        let Some(entries) = self.listeners.get_mut(key) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        let removed = entries.len() != before;

        if entries.is_empty() {
            self.listeners.remove(key);
        }
        removed
    }

    /// Snapshot of the listeners for `key`, in invocation order.
    #[must_use]
    pub fn listeners(&self, key: &DispatchKey) -> Vec<Listener> {
        self.listeners
            .get(key)
            .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn listener_count(&self, key: &DispatchKey) -> usize {
        self.listeners.get(key).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

/// Where an envelope goes and what its listeners receive.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub key: DispatchKey,
    pub payload: Value,
}

/// Resolves the dispatch key of an envelope.
///
/// Pub/sub envelopes are keyed by `d.event_type` and forward the whole `d`,
/// `event_type` included. Everything else is keyed by `t`, falling back to
/// the opcode, and forwards `d`.
#[must_use]
pub fn route(envelope: Envelope) -> Option<Route> {
    match envelope.op {
        Op::PubSub => {
            let Some(event_type) = envelope
                .d
                .get(PUBSUB_EVENT_TYPE_FIELD)
                .and_then(Value::as_str)
            else {
                trace!("Pub/sub envelope without event_type");
                return None;
            };

            Some(Route {
                key: DispatchKey::from(event_type),
                payload: envelope.d,
            })
        }
        Op::Code(code) => {
            let key = envelope
                .t
                .map_or(DispatchKey::Opcode(code), DispatchKey::from);
            Some(Route {
                key,
                payload: envelope.d,
            })
        }
    }
}

/// Invokes every listener in order. A failing or panicking listener is logged
/// and skipped. Returns how many listeners completed successfully.
pub fn deliver(key: &DispatchKey, listeners: &[Listener], payload: &Value) -> usize {
    let mut delivered = 0;

    for listener in listeners {
        match catch_unwind(AssertUnwindSafe(|| listener(payload))) {
            Ok(Ok(())) => delivered += 1,
            Ok(Err(e)) => {
                warn!(key = %key, error = %e, "Listener failed");
            }
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    (*s).to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                warn!(key = %key, panic = %panic_msg, "Listener panicked");
            }
        }
    }

    delivered
}
