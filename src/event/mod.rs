mod bus;
mod events;
mod handlers;

pub use bus::{EventBus, SubscriptionId};
pub use events::EditorEvent;
pub use handlers::EventLog;

pub trait EventHandler {
    fn handle_event(&mut self, event: &EditorEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(&EditorEvent),
{
    fn handle_event(&mut self, event: &EditorEvent) {
        self(event)
    }
}
