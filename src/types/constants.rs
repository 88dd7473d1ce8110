/// Outbound control message types (magic strings layer)
pub mod client_events {
    pub const AUTHENTICATE: &str = "authenticate";
    pub const PING: &str = "ping";
    pub const GET_ONLINE_USERS: &str = "get_online_users";
    pub const SUBSCRIBE_PREFIX: &str = "subscribe_";
    pub const UNSUBSCRIBE_PREFIX: &str = "unsubscribe_";
}

/// Inbound server event types (magic strings layer)
pub mod server_events {
    pub const AUTHENTICATED: &str = "authenticated";
    pub const ERROR: &str = "error";
    pub const SUBSCRIBED: &str = "subscribed";
    pub const UNSUBSCRIBED: &str = "unsubscribed";
    pub const PONG: &str = "pong";
    pub const LOW_STOCK_ALERT: &str = "low_stock_alert";
    pub const SYSTEM_MESSAGE: &str = "system_message";
    pub const PRODUCT_UPDATED: &str = "product_updated";
    pub const STOCK_MOVEMENT_CREATED: &str = "stock_movement_created";
    pub const STOCK_TRANSFER_UPDATED: &str = "stock_transfer_updated";
    pub const DASHBOARD_UPDATE: &str = "dashboard_update";
    pub const DASHBOARD_STATS_UPDATE: &str = "dashboard_stats_update";
    pub const ONLINE_USERS: &str = "online_users";
    pub const ADMIN_CONNECTED: &str = "admin_connected";
}

/// Channels the inventory server publishes on
pub mod channels {
    pub const DASHBOARD: &str = "dashboard";
    pub const PRODUCTS: &str = "products";
    pub const STOCK_MOVEMENTS: &str = "stock_movements";
    pub const STOCK_TRANSFERS: &str = "stock_transfers";
}

/// Path appended to the API base to reach the live-update socket
pub const WS_PATH_SUFFIX: &str = "/ws";

/// API prefix used when the endpoint is derived from the page host
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Host used when neither an API base nor a page host is configured
pub const DEFAULT_PAGE_HOST: &str = "localhost:8000";

/// Default heartbeat interval (milliseconds)
pub const HEARTBEAT_INTERVAL: u64 = 30000;

/// Reconnect policy defaults (milliseconds / attempts)
pub const INITIAL_RECONNECT_DELAY: u64 = 1000;
pub const MAX_RECONNECT_DELAY: u64 = 30000;
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Capacity of the notice broadcast channel
pub const NOTICE_CHANNEL_CAPACITY: usize = 64;

/// WebSocket close codes
pub const WS_CLOSE_NORMAL: u16 = 1000;
pub const WS_CLOSE_HEARTBEAT_TIMEOUT: u16 = 4000;

/// Login throttle defaults
pub const LOGIN_ATTEMPTS_KEY: &str = "loginAttempts";
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;
pub const LOCKOUT_DURATION_SECS: u64 = 60;
