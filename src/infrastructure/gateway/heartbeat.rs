use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, trace, warn};

use super::connection::OutboundSender;
use super::constants::HEARTBEAT_INTERVAL;
use super::payloads::Envelope;

/// Periodic keep-alive for one open connection.
///
/// At most one ticker task exists at a time. Ticks that find the connection
/// not open are skipped.
pub struct HeartbeatManager {
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl HeartbeatManager {
    /// A zero period falls back to [`HEARTBEAT_INTERVAL`].
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            warn!(
                default_ms = HEARTBEAT_INTERVAL.as_millis(),
                "Heartbeat interval must be non-zero, using default"
            );
            HEARTBEAT_INTERVAL
        } else {
            interval
        };

        Self {
            interval,
            task: None,
        }
    }

    pub fn start(&mut self, outbound: OutboundSender) {
        self.stop();

        let interval = self.interval;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);

            loop {
                ticker.tick().await;

                if !outbound.is_open() {
                    trace!("Connection not open, skipping heartbeat");
                    continue;
                }

                let timestamp = Utc::now().timestamp_millis();
                if outbound.send(Envelope::heartbeat(timestamp)) {
                    debug!(timestamp, "Sent heartbeat");
                } else {
                    trace!("Heartbeat not queued");
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Heartbeat stopped");
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.task.is_some()
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for HeartbeatManager {
    fn drop(&mut self) {
        self.stop();
    }
}
