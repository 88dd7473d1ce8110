use crate::client::{ClientState, ConnectionManager, ConnectionState};
use crate::types::OutboundMessage;
use crate::types::constants::{HEARTBEAT_INTERVAL, WS_CLOSE_HEARTBEAT_TIMEOUT};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time;

const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(HEARTBEAT_INTERVAL);

/// Why the heartbeat loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatExit {
    /// The transport it was bound to is gone
    Stale,
    /// A ping went unanswered for a whole interval; the transport was closed
    TimedOut,
}

/// Keeps one transport alive with `ping` frames while it is connected.
pub struct HeartbeatManager {
    interval: Duration,
    generation: u64,
    state: Weak<RwLock<ClientState>>,
    connection: Weak<ConnectionManager>,
}

impl HeartbeatManager {
    pub fn new(
        generation: u64,
        state: &Arc<RwLock<ClientState>>,
        connection: &Arc<ConnectionManager>,
    ) -> Self {
        Self {
            interval: DEFAULT_HEARTBEAT_INTERVAL,
            generation,
            state: Arc::downgrade(state),
            connection: Arc::downgrade(connection),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs until the transport goes stale or a ping times out
    pub async fn run(self) -> HeartbeatExit {
        let start = time::Instant::now() + self.interval;
        let mut interval_timer = time::interval_at(start, self.interval);
        interval_timer.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

        loop {
            interval_timer.tick().await;

            // Client dropped, exit heartbeat task
            let (Some(state), Some(connection)) = (self.state.upgrade(), self.connection.upgrade())
            else {
                return HeartbeatExit::Stale;
            };

            {
                let mut state = state.write().await;
                if !state.is_current(self.generation) {
                    return HeartbeatExit::Stale;
                }
                if state.status != ConnectionState::Connected {
                    continue;
                }

                if state.pending_ping {
                    tracing::warn!("[Heartbeat] Timeout detected, closing connection");
                    drop(state);
                    connection
                        .close_if_current(
                            self.generation,
                            WS_CLOSE_HEARTBEAT_TIMEOUT,
                            "heartbeat timeout",
                        )
                        .await;
                    return HeartbeatExit::TimedOut;
                }

                state.pending_ping = true;
            }

            if connection.send_message(&OutboundMessage::ping()).await {
                tracing::debug!("Sent heartbeat ping");
            } else {
                tracing::error!("[Heartbeat] Failed to send ping");
            }
        }
    }
}
