use thiserror::Error;

/// Errors that can occur inside the inventory client core.
///
/// Most public operations swallow these and degrade (a dropped message, a
/// notice, an unlocked throttle). They surface directly only from
/// construction paths and from the transport/store seams.
#[derive(Error, Debug)]
pub enum ClientError {
    /// WebSocket protocol error (connection failed, invalid frame, etc.)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// General connection error with descriptive message
    #[error("Connection error: {0}")]
    Connection(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing error (malformed API base)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Durable storage could not be read or written
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Configuration value is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Attempted operation while the transport is not open
    #[error("Not connected")]
    NotConnected,
}

/// Convenience type alias for `Result<T, ClientError>`.
pub type Result<T> = std::result::Result<T, ClientError>;
