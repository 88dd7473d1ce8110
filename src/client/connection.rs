use crate::types::{OutboundMessage, constants::WS_CLOSE_NORMAL};
use crate::websocket::TransportSink;
use tokio::sync::{RwLock, mpsc};

/// Logical state of the live-update connection.
///
/// `Connected` is only reached once the server has acknowledged the
/// authenticate handshake, not when the socket opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

enum Outbound {
    Text(String),
    Close { code: u16, reason: String },
}

struct Writer {
    generation: u64,
    tx: mpsc::UnboundedSender<Outbound>,
}

/// Owns the write half of the current transport.
///
/// Frames are handed to a dedicated writer task, so sending never waits on
/// the socket. With no transport open, outbound messages are dropped.
pub struct ConnectionManager {
    writer: RwLock<Option<Writer>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            writer: RwLock::new(None),
        }
    }

    /// Installs the write half of a freshly opened transport
    pub async fn set_writer(&self, generation: u64, mut sink: Box<dyn TransportSink>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();

        tokio::spawn(async move {
            while let Some(outbound) = rx.recv().await {
                match outbound {
                    Outbound::Text(text) => {
                        if let Err(e) = sink.send(text).await {
                            tracing::warn!("Failed to write frame: {}", e);
                            break;
                        }
                    }
                    Outbound::Close { code, reason } => {
                        if let Err(e) = sink.close(code, &reason).await {
                            tracing::debug!("Close handshake failed: {}", e);
                        }
                        break;
                    }
                }
            }
            tracing::debug!("Writer task for connection {} finished", generation);
        });

        let previous = self.writer.write().await.replace(Writer { generation, tx });
        if let Some(previous) = previous {
            let _ = previous.tx.send(Outbound::Close {
                code: WS_CLOSE_NORMAL,
                reason: "superseded".to_string(),
            });
        }
    }

    /// Sends a message if the transport is open; returns whether it was queued
    pub async fn send_message(&self, message: &OutboundMessage) -> bool {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize outbound '{}': {}", message.kind, e);
                return false;
            }
        };
        self.send_text(json).await
    }

    pub async fn send_text(&self, text: String) -> bool {
        let writer = self.writer.read().await;
        match writer.as_ref() {
            Some(writer) => writer.tx.send(Outbound::Text(text)).is_ok(),
            None => false,
        }
    }

    /// Closes the transport with the given code and forgets it
    pub async fn close(&self, code: u16, reason: &str) {
        if let Some(writer) = self.writer.write().await.take() {
            let _ = writer.tx.send(Outbound::Close {
                code,
                reason: reason.to_string(),
            });
        }
    }

    /// Closes the transport only if it still belongs to `generation`
    pub async fn close_if_current(&self, generation: u64, code: u16, reason: &str) -> bool {
        let mut guard = self.writer.write().await;
        if guard.as_ref().is_some_and(|w| w.generation == generation) {
            if let Some(writer) = guard.take() {
                let _ = writer.tx.send(Outbound::Close {
                    code,
                    reason: reason.to_string(),
                });
            }
            return true;
        }
        false
    }

    /// Drops the writer for a transport the peer already closed
    pub async fn clear_writer(&self, generation: u64) {
        let mut guard = self.writer.write().await;
        if guard.as_ref().is_some_and(|w| w.generation == generation) {
            *guard = None;
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.get_mut().take() {
            tracing::debug!("Client dropped, closing connection {}", writer.generation);
            let _ = writer.tx.send(Outbound::Close {
                code: WS_CLOSE_NORMAL,
                reason: "client dropped".to_string(),
            });
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
