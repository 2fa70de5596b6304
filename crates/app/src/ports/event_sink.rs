//! Event sink port: where inbound events are delivered.

use homehub_domain::error::HubError;
use homehub_domain::event::InboundEvent;

/// Accepts inbound events for later processing by the router.
pub trait EventSink: Send + Sync {
    /// Enqueue an event. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::FabricClosed`] when nothing consumes events anymore.
    fn receive(&self, event: InboundEvent) -> Result<(), HubError>;
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn receive(&self, event: InboundEvent) -> Result<(), HubError> {
        (**self).receive(event)
    }
}
