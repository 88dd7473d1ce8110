use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ServerEvent;
use crate::types::constants::client_events;

/// A message received from the live-update server.
///
/// Every inbound frame carries a `type` discriminator; the remaining fields
/// are free-form and kept as-is in `payload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub event: ServerEvent,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl InboundMessage {
    pub fn new(event: impl Into<ServerEvent>) -> Self {
        Self {
            event: event.into(),
            payload: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Parses a raw text frame. Returns `None` for anything that is not a JSON
    /// object with a string `type` field.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str::<Self>(text).ok()
    }

    /// Shorthand for a string field of the payload
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}

/// A message sent to the live-update server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl OutboundMessage {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    pub fn authenticate(token: &str) -> Self {
        Self::new(client_events::AUTHENTICATE).with_field("token", Value::from(token))
    }

    pub fn subscribe(channel: &str) -> Self {
        Self::new(format!("{}{}", client_events::SUBSCRIBE_PREFIX, channel))
    }

    pub fn unsubscribe(channel: &str) -> Self {
        Self::new(format!("{}{}", client_events::UNSUBSCRIBE_PREFIX, channel))
    }

    pub fn ping() -> Self {
        Self::new(client_events::PING)
    }

    pub fn get_online_users() -> Self {
        Self::new(client_events::GET_ONLINE_USERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_authenticate_carries_token() {
        let json = serde_json::to_value(OutboundMessage::authenticate("abc")).unwrap();
        assert_eq!(json, json!({"type": "authenticate", "token": "abc"}));
    }

    #[test]
    fn test_subscription_control_types() {
        assert_eq!(OutboundMessage::subscribe("products").kind, "subscribe_products");
        assert_eq!(
            OutboundMessage::unsubscribe("stock_transfers").kind,
            "unsubscribe_stock_transfers"
        );

        let json = serde_json::to_string(&OutboundMessage::subscribe("dashboard")).unwrap();
        assert_eq!(json, r#"{"type":"subscribe_dashboard"}"#);
    }

    #[test]
    fn test_parse_keeps_payload_fields() {
        let message = InboundMessage::parse(
            r#"{"type":"low_stock_alert","data":{"name":"Widget","quantity":2},"timestamp":"t"}"#,
        )
        .unwrap();

        assert_eq!(message.event, ServerEvent::LowStockAlert);
        assert_eq!(message.payload["data"]["name"], "Widget");
        assert_eq!(message.str_field("timestamp"), Some("t"));
        assert!(!message.payload.contains_key("type"));
    }

    #[test]
    fn test_parse_unknown_type_is_custom() {
        let message = InboundMessage::parse(r#"{"type":"warehouse_renamed","id":4}"#).unwrap();
        assert_eq!(
            message.event,
            ServerEvent::Custom("warehouse_renamed".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_malformed_frames() {
        assert!(InboundMessage::parse("not json").is_none());
        assert!(InboundMessage::parse("[1,2,3]").is_none());
        assert!(InboundMessage::parse(r#"{"data":1}"#).is_none());
        assert!(InboundMessage::parse(r#"{"type":7}"#).is_none());
    }
}
