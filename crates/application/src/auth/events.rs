//! Session event broadcasting.

use lifeos_domain::SessionEvent;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 32;

/// Broadcasts [`SessionEvent`]s to any number of subscribers.
///
/// Clones share the same channel. Emitting with no subscriber is not an error.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    /// Creates a channel with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Subscribes to events emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event, returning how many subscribers received it.
    pub fn emit(&self, event: SessionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
