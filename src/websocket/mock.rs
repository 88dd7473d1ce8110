//! Scripted in-memory transport used by the client tests.

use super::{Connector, Frame, TransportPair, TransportSink, TransportStream};
use crate::types::{ClientError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::Instant;

enum Scripted {
    Frame(Frame),
    Error(String),
    End,
}

/// Server side of one accepted mock connection.
#[derive(Clone)]
pub(crate) struct MockServer {
    inbound: mpsc::UnboundedSender<Scripted>,
    sent: Arc<Mutex<Vec<String>>>,
    closed_with: Arc<Mutex<Option<u16>>>,
}

impl MockServer {
    pub fn send_text(&self, text: &str) {
        let _ = self.inbound.send(Scripted::Frame(Frame::Text(text.to_string())));
    }

    pub fn send_json(&self, value: serde_json::Value) {
        self.send_text(&value.to_string());
    }

    pub fn authenticate(&self) {
        self.send_json(serde_json::json!({
            "type": "authenticated",
            "user": {"id": 1, "email": "admin@example.com", "is_admin": true}
        }));
    }

    pub fn close(&self, code: Option<u16>) {
        let _ = self.inbound.send(Scripted::Frame(Frame::Close(code)));
    }

    pub fn fail(&self, reason: &str) {
        let _ = self.inbound.send(Scripted::Error(reason.to_string()));
    }

    pub fn drop_connection(&self) {
        let _ = self.inbound.send(Scripted::End);
    }

    /// Raw frames the client wrote, in order
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// The `type` field of every frame the client wrote
    pub fn sent_types(&self) -> Vec<String> {
        self.sent()
            .iter()
            .filter_map(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
            .filter_map(|value| value.get("type").and_then(|t| t.as_str()).map(String::from))
            .collect()
    }

    pub fn count_sent(&self, kind: &str) -> usize {
        self.sent_types().iter().filter(|t| *t == kind).count()
    }

    pub fn closed_with(&self) -> Option<u16> {
        *self.closed_with.lock().unwrap()
    }
}

/// Connector that accepts or refuses attempts according to a script.
///
/// Attempts beyond the script are refused.
#[derive(Default)]
pub(crate) struct MockConnector {
    script: Mutex<VecDeque<bool>>,
    attempts: Mutex<Vec<Instant>>,
    servers: Mutex<Vec<MockServer>>,
}

impl MockConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn accept_next(&self, count: usize) {
        let mut script = self.script.lock().unwrap();
        script.extend(std::iter::repeat_n(true, count));
    }

    pub fn refuse_next(&self, count: usize) {
        let mut script = self.script.lock().unwrap();
        script.extend(std::iter::repeat_n(false, count));
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    pub fn attempt_times(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn server(&self, index: usize) -> MockServer {
        self.servers.lock().unwrap()[index].clone()
    }

    pub fn last_server(&self) -> MockServer {
        self.servers
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no connection accepted yet")
    }

    pub fn server_count(&self) -> usize {
        self.servers.lock().unwrap().len()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _url: &str) -> Result<TransportPair> {
        self.attempts.lock().unwrap().push(Instant::now());

        let accept = self.script.lock().unwrap().pop_front().unwrap_or(false);
        if !accept {
            return Err(ClientError::Connection("connection refused".to_string()));
        }

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let server = MockServer {
            inbound: inbound_tx,
            sent: Arc::new(Mutex::new(Vec::new())),
            closed_with: Arc::new(Mutex::new(None)),
        };
        self.servers.lock().unwrap().push(server.clone());

        Ok((
            Box::new(MockSink {
                sent: Arc::clone(&server.sent),
                closed_with: Arc::clone(&server.closed_with),
            }),
            Box::new(MockStream { inbound: inbound_rx }),
        ))
    }
}

struct MockSink {
    sent: Arc<Mutex<Vec<String>>>,
    closed_with: Arc<Mutex<Option<u16>>>,
}

#[async_trait]
impl TransportSink for MockSink {
    async fn send(&mut self, text: String) -> Result<()> {
        if self.closed_with.lock().unwrap().is_some() {
            return Err(ClientError::NotConnected);
        }
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn close(&mut self, code: u16, _reason: &str) -> Result<()> {
        *self.closed_with.lock().unwrap() = Some(code);
        Ok(())
    }
}

struct MockStream {
    inbound: mpsc::UnboundedReceiver<Scripted>,
}

#[async_trait]
impl TransportStream for MockStream {
    async fn next_frame(&mut self) -> Option<Result<Frame>> {
        match self.inbound.recv().await {
            Some(Scripted::Frame(frame)) => Some(Ok(frame)),
            Some(Scripted::Error(reason)) => Some(Err(ClientError::Connection(reason))),
            Some(Scripted::End) => None,
            None => std::future::pending().await,
        }
    }
}
