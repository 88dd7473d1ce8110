use crate::types::constants::server_events;
use serde::{Deserialize, Serialize};

/// Type-safe server event kinds
///
/// Anything the client does not recognise is kept as `Custom` and still
/// reaches listeners registered for that exact type string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServerEvent {
    /// Server accepted the credential
    Authenticated,
    /// Server-side error (authentication rejection, unknown command, ...)
    Error,
    /// Channel subscription acknowledged
    Subscribed,
    /// Channel unsubscription acknowledged
    Unsubscribed,
    /// Heartbeat reply
    Pong,
    /// A product fell below its stock threshold
    LowStockAlert,
    /// Broadcast notice from operators
    SystemMessage,
    ProductUpdated,
    StockMovementCreated,
    StockTransferUpdated,
    DashboardUpdate,
    DashboardStatsUpdate,
    OnlineUsers,
    AdminConnected,
    /// Custom or future event type
    Custom(String),
}

impl ServerEvent {
    /// Parse a string into a ServerEvent
    pub fn parse(s: &str) -> Self {
        match s {
            server_events::AUTHENTICATED => Self::Authenticated,
            server_events::ERROR => Self::Error,
            server_events::SUBSCRIBED => Self::Subscribed,
            server_events::UNSUBSCRIBED => Self::Unsubscribed,
            server_events::PONG => Self::Pong,
            server_events::LOW_STOCK_ALERT => Self::LowStockAlert,
            server_events::SYSTEM_MESSAGE => Self::SystemMessage,
            server_events::PRODUCT_UPDATED => Self::ProductUpdated,
            server_events::STOCK_MOVEMENT_CREATED => Self::StockMovementCreated,
            server_events::STOCK_TRANSFER_UPDATED => Self::StockTransferUpdated,
            server_events::DASHBOARD_UPDATE => Self::DashboardUpdate,
            server_events::DASHBOARD_STATS_UPDATE => Self::DashboardStatsUpdate,
            server_events::ONLINE_USERS => Self::OnlineUsers,
            server_events::ADMIN_CONNECTED => Self::AdminConnected,
            _ => Self::Custom(s.to_string()),
        }
    }

    /// Convert event to its wire representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Authenticated => server_events::AUTHENTICATED,
            Self::Error => server_events::ERROR,
            Self::Subscribed => server_events::SUBSCRIBED,
            Self::Unsubscribed => server_events::UNSUBSCRIBED,
            Self::Pong => server_events::PONG,
            Self::LowStockAlert => server_events::LOW_STOCK_ALERT,
            Self::SystemMessage => server_events::SYSTEM_MESSAGE,
            Self::ProductUpdated => server_events::PRODUCT_UPDATED,
            Self::StockMovementCreated => server_events::STOCK_MOVEMENT_CREATED,
            Self::StockTransferUpdated => server_events::STOCK_TRANSFER_UPDATED,
            Self::DashboardUpdate => server_events::DASHBOARD_UPDATE,
            Self::DashboardStatsUpdate => server_events::DASHBOARD_STATS_UPDATE,
            Self::OnlineUsers => server_events::ONLINE_USERS,
            Self::AdminConnected => server_events::ADMIN_CONNECTED,
            Self::Custom(s) => s,
        }
    }

    /// Whether the client performs built-in handling for this event
    pub fn is_system(&self) -> bool {
        matches!(
            self,
            Self::Authenticated
                | Self::Error
                | Self::Subscribed
                | Self::Unsubscribed
                | Self::Pong
                | Self::LowStockAlert
                | Self::SystemMessage
        )
    }
}

impl From<&str> for ServerEvent {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for ServerEvent {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ServerEvent> for String {
    fn from(event: ServerEvent) -> Self {
        event.as_str().to_string()
    }
}

impl std::fmt::Display for ServerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_event_parse() {
        assert_eq!(ServerEvent::parse("authenticated"), ServerEvent::Authenticated);
        assert_eq!(ServerEvent::parse("low_stock_alert"), ServerEvent::LowStockAlert);
        assert_eq!(
            ServerEvent::parse("dashboard_stats_update"),
            ServerEvent::DashboardStatsUpdate
        );
        assert_eq!(
            ServerEvent::parse("something_new"),
            ServerEvent::Custom("something_new".to_string())
        );
    }

    #[test]
    fn test_custom_event_keeps_wire_name() {
        let event = ServerEvent::from("forecast_ready");
        assert_eq!(event.as_str(), "forecast_ready");
        assert!(!event.is_system());
    }

    #[test]
    fn test_known_events_are_not_custom() {
        let events = vec![
            ServerEvent::Authenticated,
            ServerEvent::Error,
            ServerEvent::Subscribed,
            ServerEvent::Unsubscribed,
            ServerEvent::Pong,
            ServerEvent::LowStockAlert,
            ServerEvent::SystemMessage,
            ServerEvent::ProductUpdated,
            ServerEvent::StockMovementCreated,
            ServerEvent::StockTransferUpdated,
            ServerEvent::DashboardUpdate,
            ServerEvent::DashboardStatsUpdate,
            ServerEvent::OnlineUsers,
            ServerEvent::AdminConnected,
        ];

        for event in events {
            assert_eq!(ServerEvent::parse(event.as_str()), event);
        }
    }
}
