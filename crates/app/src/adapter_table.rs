//! Adapter dispatch table and the per-kind factory registry.
//!
//! [`AdapterKinds`] maps an adapter *kind* (the `type` key of an `[[adapter]]`
//! table) to a factory. At startup each configured adapter is built through
//! its kind's factory and stored in the [`AdapterTable`] under its id.

use std::collections::HashMap;
use std::sync::Arc;

use homehub_domain::command::OutboundCommand;
use homehub_domain::config::{AdapterConfig, DEVICE_GROUP_KIND};
use homehub_domain::error::{ConfigurationError, HubError};
use homehub_domain::id::AdapterId;

use crate::fabric::InboundSender;
use crate::ports::Adapter;

/// Builds an adapter from its configuration and a handle on the fabric.
pub type AdapterFactory =
    Box<dyn Fn(&AdapterConfig, InboundSender) -> Result<Arc<dyn Adapter>, HubError> + Send + Sync>;

/// Registered adapter kinds.
///
/// The `devicegroup` kind is always present.
pub struct AdapterKinds {
    factories: HashMap<String, AdapterFactory>,
}

impl Default for AdapterKinds {
    fn default() -> Self {
        let mut kinds = Self {
            factories: HashMap::new(),
        };
        kinds.register(DEVICE_GROUP_KIND, |config, _| {
            Ok(Arc::new(DeviceGroupAdapter::new(config.id.clone())))
        });
        kinds
    }
}

impl std::fmt::Debug for AdapterKinds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterKinds")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AdapterKinds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `kind`.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&AdapterConfig, InboundSender) -> Result<Arc<dyn Adapter>, HubError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
        self
    }

    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Build an adapter for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownAdapterKind`] if no factory is
    /// registered for the kind, or whatever the factory fails with.
    pub fn build(
        &self,
        config: &AdapterConfig,
        sender: InboundSender,
    ) -> Result<Arc<dyn Adapter>, HubError> {
        let factory = self.factories.get(&config.kind).ok_or_else(|| {
            ConfigurationError::UnknownAdapterKind {
                adapter: config.id.to_string(),
                kind: config.kind.clone(),
            }
        })?;
        factory(config, sender)
    }
}

/// Adapters by id.
#[derive(Default)]
pub struct AdapterTable {
    adapters: HashMap<AdapterId, Arc<dyn Adapter>>,
}

impl std::fmt::Debug for AdapterTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterTable")
            .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AdapterTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an adapter under its own id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateAdapter`] if the id is taken.
    pub fn insert(&mut self, adapter: Arc<dyn Adapter>) -> Result<(), HubError> {
        let id = adapter.id().clone();
        if self.adapters.contains_key(&id) {
            return Err(ConfigurationError::DuplicateAdapter(id.to_string()).into());
        }
        self.adapters.insert(id, adapter);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`HubError::UnknownAdapter`] if no adapter has this id.
    pub fn lookup(&self, id: &str) -> Result<&Arc<dyn Adapter>, HubError> {
        self.adapters
            .get(id)
            .ok_or_else(|| HubError::UnknownAdapter(id.to_string()))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.adapters.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Placeholder adapter behind every device group.
///
/// Group commands are fanned out to the members by the router, so nothing
/// should ever reach this adapter directly.
#[derive(Debug)]
pub struct DeviceGroupAdapter {
    id: AdapterId,
}

impl DeviceGroupAdapter {
    #[must_use]
    pub fn new(id: AdapterId) -> Self {
        Self { id }
    }
}

impl Adapter for DeviceGroupAdapter {
    fn id(&self) -> &AdapterId {
        &self.id
    }

    fn kind(&self) -> &str {
        DEVICE_GROUP_KIND
    }

    fn send(&self, command: OutboundCommand) -> Result<(), HubError> {
        Err(HubError::Adapter {
            adapter: self.id.to_string(),
            source: format!("device groups fan out in the router, got {command}").into(),
        })
    }
}
