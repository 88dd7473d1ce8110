use super::{
    ClientState, ConnectionManager, ConnectionState, RealtimeClientBuilder, RealtimeClientOptions,
    RealtimeConfig,
};
use crate::infrastructure::{HeartbeatExit, HeartbeatManager};
use crate::messaging::notice::{self, Notice};
use crate::messaging::{EventHandler, ListenerHandle, ListenerRegistry, MessageRouter};
use crate::types::constants::{WS_CLOSE_HEARTBEAT_TIMEOUT, WS_CLOSE_NORMAL};
use crate::types::{InboundMessage, OutboundMessage, Result};
use crate::websocket::{Connector, Frame, TransportStream};
use std::sync::{Arc, Weak};
use tokio::sync::{RwLock, broadcast, watch};
use url::Url;

/// The live-update connection of the inventory dashboard.
///
/// `RealtimeClient` owns one logical connection: it opens the transport,
/// authenticates, remembers channel subscriptions across reconnects, and fans
/// inbound events out to listeners registered by event type. Reconnection
/// after an abnormal close uses exponential backoff with a bounded attempt
/// budget; once the budget is spent the client stays in
/// [`ConnectionState::Error`].
///
/// None of the operations return errors. Failures are logged, reflected in
/// [`connection_state()`](Self::connection_state) and published as
/// [`Notice`]s.
///
/// # Example
///
/// ```no_run
/// use inventory_client_core::{RealtimeClient, RealtimeClientOptions, channels};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RealtimeClient::new(
///     "ws://localhost:8000/api/v1/ws",
///     RealtimeClientOptions {
///         access_token: Some("jwt".to_string()),
///         ..Default::default()
///     },
/// )?;
///
/// let listener = client.on("product_updated", |message| {
///     println!("product changed: {:?}", message.payload.get("data"));
/// });
///
/// client.subscribe_to_channel(channels::PRODUCTS).await;
/// client.connect().await;
/// // ...
/// listener.unsubscribe();
/// client.disconnect().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RealtimeClient {
    pub(crate) endpoint: Url,
    pub(crate) options: RealtimeClientOptions,
    pub(crate) connector: Arc<dyn Connector>,

    // Write half of the current transport
    pub(crate) connection: Arc<ConnectionManager>,

    // Consolidated mutable state
    pub(crate) state: Arc<RwLock<ClientState>>,

    pub(crate) listeners: ListenerRegistry,
    pub(crate) notices: broadcast::Sender<Notice>,
}

/// Non-owning handle captured by background tasks.
///
/// Reader, heartbeat and reconnect tasks upgrade it for each step, so once
/// the last [`RealtimeClient`] is dropped they stop and the transport closes.
#[derive(Clone)]
pub(crate) struct WeakClient {
    endpoint: Url,
    options: RealtimeClientOptions,
    connector: Arc<dyn Connector>,
    connection: Weak<ConnectionManager>,
    state: Weak<RwLock<ClientState>>,
    listeners: ListenerRegistry,
    notices: broadcast::Sender<Notice>,
}

impl WeakClient {
    pub(crate) fn upgrade(&self) -> Option<RealtimeClient> {
        Some(RealtimeClient {
            endpoint: self.endpoint.clone(),
            options: self.options.clone(),
            connector: Arc::clone(&self.connector),
            connection: self.connection.upgrade()?,
            state: self.state.upgrade()?,
            listeners: self.listeners.clone(),
            notices: self.notices.clone(),
        })
    }
}

impl RealtimeClient {
    /// Creates a client for a `ws://` or `wss://` endpoint using the
    /// tokio-tungstenite transport. Does not connect.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UrlParse`](crate::ClientError::UrlParse) or
    /// [`ClientError::Config`](crate::ClientError::Config) if the endpoint is
    /// not a socket URL.
    pub fn new(endpoint: &str, options: RealtimeClientOptions) -> Result<Self> {
        RealtimeClientBuilder::new(endpoint, options).map(|builder| builder.build())
    }

    /// Creates a client from environment-derived settings
    pub fn from_config(config: &RealtimeConfig) -> Result<Self> {
        let endpoint = config.endpoint()?;
        Self::new(endpoint.as_str(), config.options())
    }

    pub fn builder(endpoint: &str, options: RealtimeClientOptions) -> Result<RealtimeClientBuilder> {
        RealtimeClientBuilder::new(endpoint, options)
    }

    /// Opens the connection and sends the authenticate handshake.
    ///
    /// No-op while connected or connecting. Without an access token this logs
    /// a warning and returns without changing state. The state becomes
    /// `Connecting` immediately and `Connected` once the server acknowledges
    /// the credential.
    pub async fn connect(&self) {
        self.start_connect(None).await;
    }

    /// Closes the connection with a normal-closure code.
    ///
    /// Cancels any scheduled reconnect and forgets every channel subscription.
    /// This is the only operation that clears subscriptions.
    pub async fn disconnect(&self) {
        let mut state = self.state.write().await;

        state.cancel_reconnect();
        state.next_generation();
        state.task_manager.abort_all();
        state.subscriptions.clear();

        self.connection
            .close(WS_CLOSE_NORMAL, "Client disconnect")
            .await;
        state.set_status(ConnectionState::Disconnected);

        tracing::info!("Disconnected from live updates");
    }

    /// Sends a message if the transport is open; otherwise drops it.
    ///
    /// Returns whether the message was handed to the transport. Nothing is
    /// queued for later delivery.
    pub async fn send_message(&self, message: &OutboundMessage) -> bool {
        let sent = self.connection.send_message(message).await;
        if !sent {
            tracing::debug!("Transport not open, dropping '{}'", message.kind);
        }
        sent
    }

    /// Adds `channel` to the subscription set.
    ///
    /// Subscribing twice is a no-op. When connected the subscribe control
    /// message goes out immediately; otherwise it is sent after the next
    /// successful authentication.
    pub async fn subscribe_to_channel(&self, channel: &str) {
        let mut state = self.state.write().await;
        if !state.subscriptions.insert(channel.to_string()) {
            tracing::debug!("Already subscribed to {}", channel);
            return;
        }

        if state.status == ConnectionState::Connected {
            self.connection
                .send_message(&OutboundMessage::subscribe(channel))
                .await;
        }
        tracing::info!("Subscribed to channel: {}", channel);
    }

    /// Removes `channel` from the subscription set, telling the server when
    /// connected.
    pub async fn unsubscribe_from_channel(&self, channel: &str) {
        let mut state = self.state.write().await;
        if !state.subscriptions.remove(channel) {
            return;
        }

        if state.status == ConnectionState::Connected {
            self.connection
                .send_message(&OutboundMessage::unsubscribe(channel))
                .await;
        }
        tracing::info!("Unsubscribing from channel: {}", channel);
    }

    /// Registers `handler` for inbound messages whose `type` equals
    /// `event_type`. The returned handle removes exactly this handler.
    pub fn add_event_listener(&self, event_type: &str, handler: EventHandler) -> ListenerHandle {
        self.listeners.add(event_type, handler)
    }

    /// Closure convenience over [`add_event_listener`](Self::add_event_listener)
    pub fn on<F>(&self, event_type: &str, handler: F) -> ListenerHandle
    where
        F: Fn(&InboundMessage) + Send + Sync + 'static,
    {
        self.listeners.add(event_type, Arc::new(handler))
    }

    /// Asks the server for the online user list (admin accounts only). The
    /// reply arrives as an `online_users` event.
    pub async fn request_online_users(&self) -> bool {
        self.send_message(&OutboundMessage::get_online_users()).await
    }

    /// Replaces the credential used by subsequent connection attempts
    pub async fn set_access_token(&self, token: Option<String>) {
        self.state.write().await.access_token = token;
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.state.read().await.status
    }

    pub async fn is_connected(&self) -> bool {
        self.connection_state().await == ConnectionState::Connected
    }

    /// Watch channel that tracks every state transition
    pub async fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.read().await.state_change_tx.subscribe()
    }

    /// Receiver for user-visible notices
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Current subscription set, sorted
    pub async fn subscriptions(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.state.read().await.subscriptions.iter().cloned().collect();
        channels.sort();
        channels
    }

    /// Reconnect attempts made since the last successful authentication
    pub async fn reconnect_attempts(&self) -> u32 {
        self.state.read().await.reconnect.attempts()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub(crate) fn downgrade(&self) -> WeakClient {
        WeakClient {
            endpoint: self.endpoint.clone(),
            options: self.options.clone(),
            connector: Arc::clone(&self.connector),
            connection: Arc::downgrade(&self.connection),
            state: Arc::downgrade(&self.state),
            listeners: self.listeners.clone(),
            notices: self.notices.clone(),
        }
    }

    /// `scheduled` carries the generation a reconnect timer was armed for;
    /// the attempt is skipped if anything happened to the connection since.
    async fn start_connect(&self, scheduled: Option<u64>) {
        let (generation, token) = {
            let mut state = self.state.write().await;

            match scheduled {
                Some(armed_for) => {
                    // The timer task is the caller; drop its handle, don't abort it
                    state.reconnect_task = None;
                    if !state.is_current(armed_for) {
                        tracing::debug!("Skipping stale scheduled reconnect");
                        return;
                    }
                }
                None => state.cancel_reconnect(),
            }

            if matches!(
                state.status,
                ConnectionState::Connected | ConnectionState::Connecting
            ) {
                return;
            }

            let Some(token) = state.access_token.clone() else {
                tracing::warn!("No access token available, not connecting to live updates");
                return;
            };

            state.task_manager.abort_all();
            let generation = state.next_generation();
            state.set_status(ConnectionState::Connecting);
            (generation, token)
        };

        self.open_transport(generation, token).await;
    }

    async fn open_transport(&self, generation: u64, token: String) {
        tracing::info!("Connecting to {}", self.endpoint);

        let (sink, stream) = match self.connector.connect(self.endpoint.as_str()).await {
            Ok(pair) => pair,
            Err(e) => {
                self.handle_transport_error(generation, &e.to_string()).await;
                self.handle_transport_closed(generation, None).await;
                return;
            }
        };

        let mut state = self.state.write().await;
        if !state.is_current(generation) {
            drop(state);
            tracing::debug!("Connection attempt superseded, closing fresh transport");
            let mut sink = sink;
            let _ = sink.close(WS_CLOSE_NORMAL, "superseded").await;
            return;
        }

        self.connection.set_writer(generation, sink).await;
        self.spawn_reader(&mut state, generation, stream);
        self.spawn_heartbeat(&mut state, generation);
        drop(state);

        if !self
            .connection
            .send_message(&OutboundMessage::authenticate(&token))
            .await
        {
            tracing::warn!("Transport closed before authenticate could be sent");
        }
    }

    fn spawn_reader(
        &self,
        state: &mut ClientState,
        generation: u64,
        mut stream: Box<dyn TransportStream>,
    ) {
        let weak = self.downgrade();
        let router = MessageRouter::new(
            generation,
            &self.state,
            &self.connection,
            self.listeners.clone(),
            self.notices.clone(),
        );

        state.task_manager.spawn(async move {
            tracing::debug!("Starting read task for connection {}", generation);
            loop {
                let frame = match stream.next_frame().await {
                    Some(Ok(Frame::Text(text))) => {
                        router.route(&text).await;
                        continue;
                    }
                    other => other,
                };

                // Client dropped, nothing left to report to
                let Some(client) = weak.upgrade() else {
                    break;
                };
                match frame {
                    Some(Ok(Frame::Close(code))) => {
                        client.handle_transport_closed(generation, code).await;
                    }
                    Some(Err(e)) => {
                        client
                            .handle_transport_error(generation, &e.to_string())
                            .await;
                        client.handle_transport_closed(generation, None).await;
                    }
                    _ => client.handle_transport_closed(generation, None).await,
                }
                break;
            }
            tracing::debug!("Read task for connection {} finished", generation);
        });
    }

    fn spawn_heartbeat(&self, state: &mut ClientState, generation: u64) {
        let Some(interval) = self.options.heartbeat_interval else {
            return;
        };

        let weak = self.downgrade();
        let heartbeat = HeartbeatManager::new(generation, &self.state, &self.connection)
            .with_interval(interval);

        state.task_manager.spawn(async move {
            if heartbeat.run().await == HeartbeatExit::TimedOut
                && let Some(client) = weak.upgrade()
            {
                client
                    .handle_transport_closed(generation, Some(WS_CLOSE_HEARTBEAT_TIMEOUT))
                    .await;
            }
        });
    }

    async fn handle_transport_error(&self, generation: u64, reason: &str) {
        {
            let mut state = self.state.write().await;
            if !state.is_current(generation) {
                return;
            }
            state.set_status(ConnectionState::Error);
        }

        tracing::error!("Live connection error: {}", reason);
        notice::publish(&self.notices, Notice::error("Live update connection error"));
    }

    /// Runs once per transport. A close with the normal code ends the
    /// connection; anything else goes through the reconnect policy.
    async fn handle_transport_closed(&self, generation: u64, code: Option<u16>) {
        let mut state = self.state.write().await;
        if !state.is_current(generation) {
            tracing::debug!("Ignoring close from stale connection {}", generation);
            return;
        }

        self.connection.clear_writer(generation).await;
        state.next_generation();

        if code == Some(WS_CLOSE_NORMAL) {
            tracing::info!("Live connection closed normally");
            state.set_status(ConnectionState::Disconnected);
            return;
        }

        tracing::warn!("Live connection closed abnormally (code {:?})", code);
        self.schedule_reconnect(&mut state);
    }

    fn schedule_reconnect(&self, state: &mut ClientState) {
        let Some(delay) = state.reconnect.next_delay() else {
            state.set_status(ConnectionState::Error);
            notice::publish(
                &self.notices,
                Notice::error(format!(
                    "Live updates unavailable after {} reconnect attempts. Reload to retry.",
                    state.reconnect.max_attempts()
                )),
            );
            return;
        };

        state.set_status(ConnectionState::Disconnected);
        tracing::info!(
            "Reconnecting in {:?} (attempt {}/{})",
            delay,
            state.reconnect.attempts(),
            state.reconnect.max_attempts()
        );

        let armed_for = state.generation;
        let weak = self.downgrade();
        state.cancel_reconnect();
        state.reconnect_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(client) = weak.upgrade() {
                client.start_connect(Some(armed_for)).await;
            }
        }));
    }
}
