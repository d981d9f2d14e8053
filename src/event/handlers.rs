use std::cell::RefCell;
use std::rc::Rc;
use crate::event::{EditorEvent, EventHandler};

/// Records every event it receives.
///
/// Clones share the same log, so one clone can be subscribed while another
/// is kept around for inspection.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<EditorEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far
    pub fn events(&self) -> Vec<EditorEvent> {
        self.events.borrow().clone()
    }

    /// Names of the events seen so far, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(EditorEvent::name).collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventHandler for EventLog {
    fn handle_event(&mut self, event: &EditorEvent) {
        log::trace!("event: {event}");
        self.events.borrow_mut().push(*event);
    }
}
