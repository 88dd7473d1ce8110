use super::notice::{self, Notice, NoticeLevel};
use super::{ListenerRegistry, ServerEvent};
use crate::client::{ClientState, ConnectionManager, ConnectionState};
use crate::types::{InboundMessage, OutboundMessage};
use std::sync::{Arc, Weak};
use tokio::sync::{RwLock, broadcast};

/// Routes incoming frames of one transport to built-in handling and listeners.
///
/// Holds the client weakly; frames arriving after the client was dropped are
/// ignored.
pub struct MessageRouter {
    generation: u64,
    state: Weak<RwLock<ClientState>>,
    connection: Weak<ConnectionManager>,
    listeners: ListenerRegistry,
    notices: broadcast::Sender<Notice>,
}

impl MessageRouter {
    pub fn new(
        generation: u64,
        state: &Arc<RwLock<ClientState>>,
        connection: &Arc<ConnectionManager>,
        listeners: ListenerRegistry,
        notices: broadcast::Sender<Notice>,
    ) -> Self {
        Self {
            generation,
            state: Arc::downgrade(state),
            connection: Arc::downgrade(connection),
            listeners,
            notices,
        }
    }

    /// Routes a raw text frame. Malformed frames are dropped.
    pub async fn route(&self, text: &str) {
        let Some(message) = InboundMessage::parse(text) else {
            tracing::warn!("Dropping malformed message: {}", text);
            return;
        };

        let (Some(state), Some(connection)) = (self.state.upgrade(), self.connection.upgrade())
        else {
            tracing::debug!("Client dropped, ignoring '{}'", message.event);
            return;
        };

        if !state.read().await.is_current(self.generation) {
            tracing::debug!(
                "Ignoring '{}' from stale connection {}",
                message.event,
                self.generation
            );
            return;
        }

        tracing::debug!("Routing message: type={}", message.event);

        if message.event.is_system() {
            self.handle_system(&state, &connection, &message).await;
        }

        let delivered = self.listeners.emit(&message);
        tracing::debug!("Delivered '{}' to {} listener(s)", message.event, delivered);
    }

    async fn handle_system(
        &self,
        state: &RwLock<ClientState>,
        connection: &ConnectionManager,
        message: &InboundMessage,
    ) {
        match &message.event {
            ServerEvent::Authenticated => self.handle_authenticated(state, connection).await,
            ServerEvent::Error => self.handle_server_error(state, message).await,
            ServerEvent::Subscribed | ServerEvent::Unsubscribed => {
                tracing::debug!(
                    "Server confirmed {} for channel {}",
                    message.event,
                    message.str_field("channel").unwrap_or("<unknown>")
                );
            }
            ServerEvent::Pong => {
                let mut state = state.write().await;
                if state.is_current(self.generation) {
                    state.pending_ping = false;
                }
            }
            ServerEvent::LowStockAlert => {
                let product = message
                    .payload
                    .get("data")
                    .and_then(|data| data.get("name"))
                    .and_then(|name| name.as_str());
                let text = match product {
                    Some(name) => format!("Low stock alert: {}", name),
                    None => "Low stock alert".to_string(),
                };
                notice::publish(&self.notices, Notice::warning(text));
            }
            ServerEvent::SystemMessage => {
                let level = message
                    .str_field("message_type")
                    .map_or(NoticeLevel::Info, NoticeLevel::parse);
                let text = message.str_field("message").unwrap_or("System notice");
                notice::publish(&self.notices, Notice::new(level, text));
            }
            _ => {}
        }
    }

    /// Completes the handshake: marks the connection live, resets the
    /// reconnect budget and replays every remembered subscription once.
    async fn handle_authenticated(&self, state: &RwLock<ClientState>, connection: &ConnectionManager) {
        let mut state = state.write().await;
        if !state.is_current(self.generation) {
            return;
        }
        if state.status == ConnectionState::Connected {
            tracing::debug!("Duplicate authenticated message ignored");
            return;
        }

        state.set_status(ConnectionState::Connected);
        state.reconnect.reset();

        let channels: Vec<String> = state.subscriptions.iter().cloned().collect();
        for channel in channels.iter() {
            if !connection
                .send_message(&OutboundMessage::subscribe(channel))
                .await
            {
                tracing::warn!("Could not replay subscription to {}", channel);
            }
        }
        drop(state);

        tracing::info!(
            "Authenticated; replayed {} subscription(s)",
            channels.len()
        );
        notice::publish(&self.notices, Notice::success("Live updates connected"));
    }

    async fn handle_server_error(&self, state: &RwLock<ClientState>, message: &InboundMessage) {
        let text = message
            .str_field("message")
            .unwrap_or("Unknown server error")
            .to_string();

        {
            let mut state = state.write().await;
            if state.is_current(self.generation) && state.status == ConnectionState::Connecting {
                tracing::warn!("Authentication rejected: {}", text);
                state.set_status(ConnectionState::Error);
            }
        }

        notice::publish(&self.notices, Notice::error(text));
    }
}
