//! Transport seam between the realtime client and the socket.
//!
//! The client never touches a socket directly: a [`Connector`] opens a
//! transport and hands back its write half ([`TransportSink`]) and read half
//! ([`TransportStream`]). Production code uses [`TungsteniteConnector`]; tests
//! plug in a scripted connector.

mod factory;
#[cfg(test)]
pub(crate) mod mock;

pub use factory::{TungsteniteConnector, WebSocketFactory};

use crate::types::Result;
use async_trait::async_trait;

/// One inbound event from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Text payload
    Text(String),
    /// Close handshake, with the peer's close code when one was sent
    Close(Option<u16>),
}

/// Write half of an open transport
#[async_trait]
pub trait TransportSink: Send {
    async fn send(&mut self, text: String) -> Result<()>;
    async fn close(&mut self, code: u16, reason: &str) -> Result<()>;
}

/// Read half of an open transport
///
/// `None` means the transport ended without a close handshake.
#[async_trait]
pub trait TransportStream: Send {
    async fn next_frame(&mut self) -> Option<Result<Frame>>;
}

pub type TransportPair = (Box<dyn TransportSink>, Box<dyn TransportStream>);

/// Opens a fresh transport for each connection attempt
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<TransportPair>;
}
