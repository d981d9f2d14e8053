use std::cell::{Cell, RefCell};
use crate::event::{EditorEvent, EventHandler};

/// Identifies a subscription so it can be removed again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

/// A simple event bus for broadcasting editor events to registered handlers
pub struct EventBus {
    handlers: RefCell<Vec<(SubscriptionId, Box<dyn EventHandler>)>>,
    next_id: Cell<usize>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handlers.borrow().len()))
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a new event bus
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Subscribe a handler to receive events
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    /// Subscribe a closure to receive events
    pub fn subscribe_fn(&self, f: impl FnMut(&EditorEvent) + 'static) -> SubscriptionId {
        self.subscribe(Box::new(f))
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Emit an event to all registered handlers, in subscription order.
    ///
    /// Handlers must not subscribe or unsubscribe while an event is being emitted.
    pub fn emit(&self, event: &EditorEvent) {
        for (_, handler) in self.handlers.borrow_mut().iter_mut() {
            handler.handle_event(event);
        }
    }
}
