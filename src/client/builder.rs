use super::{ClientState, ConnectionManager, ConnectionState, RealtimeClient};
use crate::infrastructure::{BackoffConfig, ReconnectPolicy};
use crate::messaging::ListenerRegistry;
use crate::types::constants::{HEARTBEAT_INTERVAL, NOTICE_CHANNEL_CAPACITY};
use crate::types::{ClientError, Result};
use crate::websocket::{Connector, TungsteniteConnector};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, broadcast, watch};
use url::Url;

#[derive(Debug, Clone)]
pub struct RealtimeClientOptions {
    /// Credential sent in the authenticate handshake. Without one, `connect()`
    /// does nothing.
    pub access_token: Option<String>,
    /// Interval between `ping` frames; `None` disables the heartbeat
    pub heartbeat_interval: Option<Duration>,
    pub backoff: BackoffConfig,
    pub notice_capacity: usize,
}

impl Default for RealtimeClientOptions {
    fn default() -> Self {
        Self {
            access_token: None,
            heartbeat_interval: Some(Duration::from_millis(HEARTBEAT_INTERVAL)),
            backoff: BackoffConfig::default(),
            notice_capacity: NOTICE_CHANNEL_CAPACITY,
        }
    }
}

/// Builder for RealtimeClient that handles initialization
pub struct RealtimeClientBuilder {
    endpoint: Url,
    options: RealtimeClientOptions,
    connector: Arc<dyn Connector>,
}

impl RealtimeClientBuilder {
    /// Create a new builder for a `ws://` or `wss://` endpoint
    pub fn new(endpoint: &str, options: RealtimeClientOptions) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;

        if !matches!(endpoint.scheme(), "ws" | "wss") {
            return Err(ClientError::Config(format!(
                "live-update endpoint must use ws or wss, got '{}'",
                endpoint.scheme()
            )));
        }

        Ok(Self {
            endpoint,
            options,
            connector: Arc::new(TungsteniteConnector),
        })
    }

    /// Replace the transport used for every connection attempt
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn build(self) -> RealtimeClient {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (notices, _) = broadcast::channel(self.options.notice_capacity.max(1));

        let client_state = ClientState::new(
            self.options.access_token.clone(),
            ReconnectPolicy::new(self.options.backoff),
            state_tx,
        );

        RealtimeClient {
            endpoint: self.endpoint,
            options: self.options,
            connector: self.connector,
            connection: Arc::new(ConnectionManager::new()),
            state: Arc::new(RwLock::new(client_state)),
            listeners: ListenerRegistry::new(),
            notices,
        }
    }
}
