// Messaging module - Event kinds, listeners, notices and message routing
pub mod event;
pub mod listeners;
pub mod notice;
pub mod router;

pub use event::ServerEvent;
pub use listeners::{EventHandler, ListenerHandle, ListenerRegistry};
pub use notice::{Notice, NoticeLevel};
pub use router::MessageRouter;
