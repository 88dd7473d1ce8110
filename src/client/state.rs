use super::connection::ConnectionState;
use crate::infrastructure::{ReconnectPolicy, TaskManager};
use std::collections::HashSet;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Consolidated mutable state for RealtimeClient
/// Using a single struct keeps status, generation and subscriptions consistent
pub struct ClientState {
    /// Current logical connection state
    pub status: ConnectionState,

    /// Identifies the current transport; bumped whenever a transport is
    /// opened, lost or torn down so late callbacks can detect they are stale
    pub generation: u64,

    /// Channels to (re)subscribe after every successful authentication
    pub subscriptions: HashSet<String>,

    /// Credential sent in the authenticate handshake
    pub access_token: Option<String>,

    /// Attempt counter and backoff interval
    pub reconnect: ReconnectPolicy,

    /// Pending scheduled reconnect (if any)
    pub reconnect_task: Option<JoinHandle<()>>,

    /// Reader and heartbeat tasks for the current transport
    pub task_manager: TaskManager,

    /// Whether a heartbeat ping is awaiting its pong
    pub pending_ping: bool,

    /// Sender for state change notifications
    pub state_change_tx: watch::Sender<ConnectionState>,
}

impl ClientState {
    pub fn new(
        access_token: Option<String>,
        reconnect: ReconnectPolicy,
        state_change_tx: watch::Sender<ConnectionState>,
    ) -> Self {
        Self {
            status: ConnectionState::Disconnected,
            generation: 0,
            subscriptions: HashSet::new(),
            access_token,
            reconnect,
            reconnect_task: None,
            task_manager: TaskManager::new(),
            pending_ping: false,
            state_change_tx,
        }
    }

    /// Update status and notify watchers
    pub fn set_status(&mut self, status: ConnectionState) {
        if self.status == status {
            return;
        }
        tracing::debug!("Connection state {:?} -> {:?}", self.status, status);
        self.status = status;
        self.state_change_tx.send_replace(status);
    }

    /// Invalidate every callback bound to the current transport
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.pending_ping = false;
        self.generation
    }

    /// Abort the scheduled reconnect, if one is pending
    pub fn cancel_reconnect(&mut self) {
        if let Some(handle) = self.reconnect_task.take() {
            tracing::debug!("Cancelling scheduled reconnect");
            handle.abort();
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

impl Drop for ClientState {
    fn drop(&mut self) {
        // Last client handle is gone; nothing may outlive it
        self.cancel_reconnect();
        self.task_manager.abort_all();
    }
}
