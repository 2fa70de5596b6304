//! Device registry: every configured device, keyed by id.
//!
//! Devices are inserted once at startup and never removed. The router owns
//! the registry and is its only writer.

use std::collections::HashMap;

use homehub_domain::device::{Device, RuntimeUpdate, Statefile};
use homehub_domain::error::{ConfigurationError, HubError};
use homehub_domain::id::DeviceId;

#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<DeviceId, Device>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateDevice`] if the id is taken.
    pub fn insert(&mut self, device: Device) -> Result<(), HubError> {
        if self.devices.contains_key(device.id()) {
            return Err(ConfigurationError::DuplicateDevice(device.id().to_string()).into());
        }
        self.devices.insert(device.id().clone(), device);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`HubError::UnknownDevice`] if no device has this id.
    pub fn lookup(&self, id: &str) -> Result<&Device, HubError> {
        self.devices
            .get(id)
            .ok_or_else(|| HubError::UnknownDevice(id.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`HubError::UnknownDevice`] if no device has this id.
    pub fn lookup_mut(&mut self, id: &str) -> Result<&mut Device, HubError> {
        self.devices
            .get_mut(id)
            .ok_or_else(|| HubError::UnknownDevice(id.to_string()))
    }

    /// Apply a runtime mutation to one device.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UnknownDevice`] if no device has this id.
    pub fn update(&mut self, id: &str, update: RuntimeUpdate) -> Result<(), HubError> {
        self.lookup_mut(id)?.apply(update);
        Ok(())
    }

    /// The devices a command for `id` ends up on: the members of a group,
    /// otherwise the device itself.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UnknownDevice`] if no device has this id.
    pub fn targets(&self, id: &str) -> Result<Vec<DeviceId>, HubError> {
        let device = self.lookup(id)?;
        if device.is_group() {
            Ok(device.members.clone())
        } else {
            Ok(vec![device.id().clone()])
        }
    }

    /// Persisted fields of every device, ordered by id.
    #[must_use]
    pub fn snapshot_all(&self) -> Statefile {
        Statefile {
            devices: self
                .devices
                .iter()
                .map(|(id, device)| (id.clone(), device.snapshot()))
                .collect(),
        }
    }

    /// Overwrite persisted fields from a snapshot. Entries for ids that are
    /// no longer configured are skipped.
    pub fn restore(&mut self, statefile: &Statefile) {
        for (id, snapshot) in &statefile.devices {
            match self.devices.get_mut(id) {
                Some(device) => device.restore(snapshot),
                None => tracing::debug!(device = %id, "ignoring snapshot of unknown device"),
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
