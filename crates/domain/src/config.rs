//! Configuration document: adapters, devices, groups, booleans, subscriptions.
//!
//! These are the declarative inputs the hub is built from at startup. The
//! binary decides the file format; this module only defines the shapes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::automation::Subscription;
use crate::device::DeviceConfig;
use crate::error::{ConfigurationError, HubError};
use crate::id::{AdapterId, DeviceId};

/// Adapter kind reserved for synthetic device-group adapters.
pub const DEVICE_GROUP_KIND: &str = "devicegroup";

/// One adapter instance: its id, kind, and kind-specific parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    pub id: AdapterId,
    /// Selects which adapter implementation handles this instance.
    #[serde(rename = "type")]
    pub kind: String,
    /// Everything else in the adapter's table.
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl AdapterConfig {
    #[must_use]
    pub fn new(id: impl Into<AdapterId>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            params: serde_json::Map::new(),
        }
    }

    /// Decode the kind-specific parameters into a typed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::AdapterParams`] if the parameters do not
    /// match `T`.
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, HubError> {
        serde_json::from_value(serde_json::Value::Object(self.params.clone())).map_err(|source| {
            ConfigurationError::AdapterParams {
                adapter: self.id.to_string(),
                source,
            }
            .into()
        })
    }
}

/// A virtual device fanning out to several physical devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceGroupConfig {
    #[serde(alias = "id")]
    pub device_id: DeviceId,
    pub name: String,
    pub devices: Vec<DeviceId>,
}

/// Declaration of a named boolean and its startup value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanConfig {
    pub name: String,
    #[serde(default)]
    pub initial: bool,
}

/// The full set of declarations the hub is built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topology {
    #[serde(rename = "adapter")]
    pub adapters: Vec<AdapterConfig>,
    #[serde(rename = "device")]
    pub devices: Vec<DeviceConfig>,
    #[serde(rename = "devicegroup")]
    pub device_groups: Vec<DeviceGroupConfig>,
    #[serde(rename = "boolean")]
    pub booleans: Vec<BooleanConfig>,
    #[serde(rename = "subscribe")]
    pub subscriptions: Vec<Subscription>,
}
