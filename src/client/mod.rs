// Module declarations
mod builder;
mod client;
mod config;
mod connection;
mod state;

// Public API exports
pub use builder::{RealtimeClientBuilder, RealtimeClientOptions};
pub use client::RealtimeClient;
pub use config::RealtimeConfig;
pub use connection::{ConnectionManager, ConnectionState};
pub use state::ClientState;
