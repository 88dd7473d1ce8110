use crate::types::InboundMessage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Callback invoked for every inbound message of the registered type.
pub type EventHandler = Arc<dyn Fn(&InboundMessage) + Send + Sync + 'static>;

type Bindings = HashMap<String, Vec<EventHandler>>;

/// Observer registry mapping an event type to its handlers.
///
/// A handler is identified by its `Arc` allocation: registering the same
/// `EventHandler` twice for one type keeps a single entry.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    bindings: Arc<Mutex<Bindings>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(bindings: &Mutex<Bindings>) -> MutexGuard<'_, Bindings> {
        bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `handler` for `event_type` and returns the handle that removes it.
    pub fn add(&self, event_type: &str, handler: EventHandler) -> ListenerHandle {
        {
            let mut bindings = Self::lock(&self.bindings);
            let handlers = bindings.entry(event_type.to_string()).or_default();
            if !handlers.iter().any(|h| Arc::ptr_eq(h, &handler)) {
                handlers.push(Arc::clone(&handler));
            }
        }

        ListenerHandle {
            bindings: Arc::downgrade(&self.bindings),
            event_type: event_type.to_string(),
            handler,
        }
    }

    /// Removes exactly `handler` from `event_type`, dropping the type entry
    /// once it has no handlers left.
    pub fn remove(&self, event_type: &str, handler: &EventHandler) -> bool {
        remove_binding(&self.bindings, event_type, handler)
    }

    /// Invokes every handler registered for the message's type.
    ///
    /// Handlers run outside the registry lock, so a handler may register or
    /// unregister listeners without deadlocking.
    pub fn emit(&self, message: &InboundMessage) -> usize {
        let handlers: Vec<EventHandler> = {
            let bindings = Self::lock(&self.bindings);
            match bindings.get(message.event.as_str()) {
                Some(handlers) => handlers.clone(),
                None => return 0,
            }
        };

        for handler in handlers.iter() {
            handler(message);
        }
        handlers.len()
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        Self::lock(&self.bindings)
            .get(event_type)
            .map_or(0, Vec::len)
    }

    pub fn has_event_type(&self, event_type: &str) -> bool {
        Self::lock(&self.bindings).contains_key(event_type)
    }
}

fn remove_binding(bindings: &Mutex<Bindings>, event_type: &str, handler: &EventHandler) -> bool {
    let mut bindings = ListenerRegistry::lock(bindings);
    let Some(handlers) = bindings.get_mut(event_type) else {
        return false;
    };

    let before = handlers.len();
    handlers.retain(|h| !Arc::ptr_eq(h, handler));
    let removed = handlers.len() != before;

    if handlers.is_empty() {
        bindings.remove(event_type);
    }
    removed
}

/// Returned by [`ListenerRegistry::add`]; call [`unsubscribe`](Self::unsubscribe)
/// to remove the handler it was created for.
///
/// Dropping the handle without calling `unsubscribe` leaves the listener in place.
pub struct ListenerHandle {
    bindings: Weak<Mutex<Bindings>>,
    event_type: String,
    handler: EventHandler,
}

impl ListenerHandle {
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn unsubscribe(self) {
        if let Some(bindings) = self.bindings.upgrade() {
            remove_binding(&bindings, &self.event_type, &self.handler);
        }
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("event_type", &self.event_type)
            .finish_non_exhaustive()
    }
}
