// Infrastructure module - Core background services and utilities
pub mod backoff;
pub mod endpoint;
pub mod heartbeat;
pub mod task_manager;

pub use backoff::{BackoffConfig, ReconnectPolicy};
pub use endpoint::{endpoint_from_host, websocket_endpoint};
pub use heartbeat::{HeartbeatExit, HeartbeatManager};
pub use task_manager::TaskManager;
