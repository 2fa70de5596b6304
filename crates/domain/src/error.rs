//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HubError`]
//! via `From`. Configuration problems are fatal at startup; everything else
//! is scoped to a single event or action and only ever logged.

use crate::device::Capability;

/// Boxed error coming from an adapter or a persistence backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error type of the hub.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The configuration document is inconsistent.
    #[error("invalid configuration")]
    Configuration(#[from] ConfigurationError),

    #[error("unknown device: {0}")]
    UnknownDevice(String),

    #[error("unknown boolean: {0}")]
    UnknownBoolean(String),

    #[error("unknown adapter: {0}")]
    UnknownAdapter(String),

    /// The device type of the target does not allow the requested command.
    #[error("device {device} does not support {capability}")]
    UnsupportedCapability {
        device: String,
        capability: Capability,
    },

    /// A subscription action could not be executed.
    #[error("action {action} failed")]
    ActionFailed {
        action: String,
        #[source]
        source: Box<HubError>,
    },

    /// An adapter refused an outbound command.
    #[error("adapter {adapter} rejected command")]
    Adapter {
        adapter: String,
        #[source]
        source: BoxError,
    },

    /// Reading or writing the state snapshot failed.
    #[error("state persistence failed")]
    Persistence(#[source] BoxError),

    /// A boolean cascade went deeper than the configured limit.
    #[error("cascade depth limit of {limit} exceeded by {event}")]
    CascadeLimitExceeded { event: String, limit: usize },

    /// The router is gone and no longer accepts inbound events.
    #[error("inbound event fabric is closed")]
    FabricClosed,
}

/// Fatal problems detected while building the hub from its configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("two subscriptions for event {0}")]
    DuplicateSubscription(String),

    #[error("duplicate device id {0}")]
    DuplicateDevice(String),

    #[error("duplicate adapter id {0}")]
    DuplicateAdapter(String),

    #[error("adapter {adapter} has unknown kind {kind}")]
    UnknownAdapterKind { adapter: String, kind: String },

    #[error("device {device} references unknown adapter {adapter}")]
    UnknownAdapter { device: String, adapter: String },

    #[error("device group {0} has no members")]
    EmptyDeviceGroup(String),

    #[error("device group {group} member not found: {member}")]
    GroupMemberNotFound { group: String, member: String },

    #[error("subscription has an empty trigger event")]
    EmptyTrigger,

    #[error("subscription for {0} has no actions")]
    NoActions(String),

    #[error("invalid parameters for adapter {adapter}")]
    AdapterParams {
        adapter: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid hub settings: {0}")]
    Settings(String),
}
