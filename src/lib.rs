//! # Inventory Client Core
//!
//! Client-side state machines behind the inventory dashboard:
//!
//! - [`RealtimeClient`]: the live-update WebSocket connection (authenticate
//!   handshake, channel subscriptions that survive reconnects, bounded
//!   exponential backoff, typed event fan-out to listeners).
//! - [`LoginThrottle`]: failed-login counting with a timed lockout, persisted
//!   in a durable key-value store.
//!
//! ## Example
//!
//! ```no_run
//! use inventory_client_core::{RealtimeClient, RealtimeConfig, channels};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RealtimeClient::from_config(&RealtimeConfig::from_env())?;
//!
//!     let alerts = client.on("low_stock_alert", |message| {
//!         println!("low stock: {:?}", message.payload.get("data"));
//!     });
//!
//!     client.subscribe_to_channel(channels::DASHBOARD).await;
//!     client.connect().await;
//!
//!     tokio::signal::ctrl_c().await?;
//!     alerts.unsubscribe();
//!     client.disconnect().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod infrastructure;
pub mod messaging;
pub mod throttle;
pub mod types;
pub mod websocket;

pub use client::{ConnectionState, RealtimeClient, RealtimeClientOptions, RealtimeConfig};
pub use infrastructure::BackoffConfig;
pub use messaging::{EventHandler, ListenerHandle, Notice, NoticeLevel, ServerEvent};
pub use throttle::{
    AttemptOutcome, AttemptStore, Clock, FileStore, LockStatus, LoginAttemptRecord, LoginThrottle,
    ManualClock, MemoryStore, SystemClock, ThrottlePolicy,
};
pub use types::constants::channels;
pub use types::{ClientError, InboundMessage, OutboundMessage, Result};
