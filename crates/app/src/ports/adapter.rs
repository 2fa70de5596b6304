//! Adapter port: the outbound half of a device integration.
//!
//! An adapter bridges one device ecosystem (cloud API, infrared blaster,
//! bulb bridge, …) into the hub. It is built once at startup by a factory
//! registered for its kind, receives a handle to the inbound fabric for
//! anything it hears, and owns its connections for the process lifetime.

use homehub_domain::command::OutboundCommand;
use homehub_domain::error::HubError;
use homehub_domain::id::AdapterId;

/// A running adapter instance accepting outbound commands.
///
/// `send` must not block: adapters queue the command for their own
/// background work and return.
pub trait Adapter: Send + Sync {
    /// The configured id of this instance.
    fn id(&self) -> &AdapterId;

    /// The kind this instance was built from (e.g. `"virtual"`).
    fn kind(&self) -> &str;

    /// Hand one command to the adapter.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Adapter`] when the adapter cannot accept the command.
    fn send(&self, command: OutboundCommand) -> Result<(), HubError>;
}
