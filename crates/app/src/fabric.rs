//! Inbound event fabric backed by an unbounded tokio mpsc channel.
//!
//! Any number of producers hold an [`InboundSender`]; the router is the one
//! consumer. Events from a single producer arrive in the order they were
//! sent, and `receive` never blocks.

use tokio::sync::mpsc;

use homehub_domain::error::HubError;
use homehub_domain::event::InboundEvent;

use crate::ports::EventSink;

/// Producer handle for the inbound fabric.
#[derive(Debug, Clone)]
pub struct InboundSender(mpsc::UnboundedSender<InboundEvent>);

impl EventSink for InboundSender {
    fn receive(&self, event: InboundEvent) -> Result<(), HubError> {
        self.0.send(event).map_err(|_| HubError::FabricClosed)
    }
}

/// Multi-producer, single-consumer event intake.
#[derive(Debug)]
pub struct InboundFabric {
    sender: InboundSender,
    receiver: mpsc::UnboundedReceiver<InboundEvent>,
}

impl Default for InboundFabric {
    fn default() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender: InboundSender(sender),
            receiver,
        }
    }
}

impl InboundFabric {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A new producer handle.
    #[must_use]
    pub fn sender(&self) -> InboundSender {
        self.sender.clone()
    }

    /// Wait for the next event.
    ///
    /// The fabric keeps a sender of its own, so this only yields `None` if
    /// the channel is closed explicitly.
    pub async fn next(&mut self) -> Option<InboundEvent> {
        self.receiver.recv().await
    }

    /// Take the next event if one is already queued.
    pub fn try_next(&mut self) -> Option<InboundEvent> {
        self.receiver.try_recv().ok()
    }
}
