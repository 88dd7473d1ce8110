use super::{Connector, Frame, TransportPair, TransportSink, TransportStream};
use crate::types::Result;
use async_trait::async_trait;
use futures::SinkExt;
use futures::stream::{SplitSink, SplitStream, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket factory for creating WebSocket connections
pub struct WebSocketFactory;

impl WebSocketFactory {
    /// Create a new WebSocket connection
    pub async fn create(url: &str) -> Result<WsStream> {
        tracing::debug!("Creating WebSocket connection to: {}", url);
        let (ws_stream, response) = tokio_tungstenite::connect_async(url).await?;
        tracing::debug!("WebSocket handshake completed: {}", response.status());
        Ok(ws_stream)
    }
}

/// [`Connector`] backed by tokio-tungstenite
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<TransportPair> {
        let ws_stream = WebSocketFactory::create(url).await?;
        let (write_half, read_half) = ws_stream.split();
        Ok((
            Box::new(TungsteniteSink { inner: write_half }),
            Box::new(TungsteniteStream { inner: read_half }),
        ))
    }
}

struct TungsteniteSink {
    inner: SplitSink<WsStream, Message>,
}

#[async_trait]
impl TransportSink for TungsteniteSink {
    async fn send(&mut self, text: String) -> Result<()> {
        self.inner.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<()> {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_string().into(),
        };
        self.inner.send(Message::Close(Some(frame))).await?;
        self.inner.close().await?;
        Ok(())
    }
}

struct TungsteniteStream {
    inner: SplitStream<WsStream>,
}

#[async_trait]
impl TransportStream for TungsteniteStream {
    async fn next_frame(&mut self) -> Option<Result<Frame>> {
        while let Some(msg_result) = self.inner.next().await {
            let msg = match msg_result {
                Ok(msg) => msg,
                Err(e) => return Some(Err(e.into())),
            };

            match msg {
                Message::Text(text) => return Some(Ok(Frame::Text(text.to_string()))),
                Message::Close(frame) => {
                    let code = frame.map(|close_frame| {
                        tracing::debug!(
                            "Server closed connection: code={:?}, reason='{}'",
                            close_frame.code,
                            close_frame.reason
                        );
                        u16::from(close_frame.code)
                    });
                    return Some(Ok(Frame::Close(code)));
                }
                Message::Ping(data) => {
                    tracing::debug!("Received ping ({} bytes)", data.len());
                }
                Message::Pong(data) => {
                    tracing::debug!("Received pong ({} bytes)", data.len());
                }
                Message::Binary(data) => {
                    tracing::warn!(
                        "Received unexpected binary message ({} bytes)",
                        data.len()
                    );
                }
                Message::Frame(_) => {
                    tracing::debug!("Received raw frame (internal)");
                }
            }
        }
        None
    }
}
