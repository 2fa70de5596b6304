//! Bootstrap: building a ready-to-run [`Router`] from a [`Topology`].
//!
//! Every configuration error is detected here, before the router starts:
//! duplicate ids, unknown adapter kinds, devices pointing at adapters that do
//! not exist, broken device groups and duplicate subscriptions.

use std::collections::HashSet;

use homehub_domain::boolean::BooleanStore;
use homehub_domain::config::{
    AdapterConfig, BooleanConfig, DEVICE_GROUP_KIND, DeviceGroupConfig, Topology,
};
use homehub_domain::device::{Device, DeviceConfig};
use homehub_domain::error::{ConfigurationError, HubError};
use homehub_domain::id::AdapterId;
use homehub_domain::time;

use crate::adapter_table::{AdapterKinds, AdapterTable};
use crate::automation_engine::AutomationEngine;
use crate::device_registry::DeviceRegistry;
use crate::fabric::InboundFabric;
use crate::ports::{DaylightOracle, StateStore};
use crate::router::{Router, RouterSettings};

/// Boolean declared when the configuration declares none.
pub const DEFAULT_BOOLEAN: &str = "anybodyHome";

/// Synthetic adapters and devices standing for the configured device groups.
#[derive(Debug, Default)]
pub struct ExpandedGroups {
    pub adapters: Vec<AdapterConfig>,
    pub devices: Vec<Device>,
}

/// Turn every `[[devicegroup]]` into a `devicegroup` adapter named
/// `<group>Group` and a group device fanning out to its members.
///
/// The group device takes its type and category from its first member.
///
/// # Errors
///
/// Returns [`ConfigurationError::EmptyDeviceGroup`] for a group without
/// members and [`ConfigurationError::GroupMemberNotFound`] for a member that
/// is not a declared device.
pub fn expand_device_groups(
    devices: &[DeviceConfig],
    groups: &[DeviceGroupConfig],
) -> Result<ExpandedGroups, HubError> {
    let mut expanded = ExpandedGroups::default();
    for group in groups {
        let mut template = None;
        for member in &group.devices {
            let config = devices
                .iter()
                .find(|device| &device.id == member)
                .ok_or_else(|| ConfigurationError::GroupMemberNotFound {
                    group: group.device_id.to_string(),
                    member: member.to_string(),
                })?;
            template.get_or_insert(config);
        }
        let Some(template) = template else {
            return Err(ConfigurationError::EmptyDeviceGroup(group.device_id.to_string()).into());
        };

        let adapter = AdapterId::new(format!("{}Group", group.device_id));
        expanded
            .adapters
            .push(AdapterConfig::new(adapter.clone(), DEVICE_GROUP_KIND));
        expanded.devices.push(Device::group(
            DeviceConfig {
                id: group.device_id.clone(),
                device_type: template.device_type,
                adapter,
                adapters_device_id: None,
                name: group.name.clone(),
                description: String::new(),
                power_on_cmd: String::new(),
                power_off_cmd: String::new(),
                category: template.category.clone(),
            },
            group.devices.clone(),
        ));
    }
    Ok(expanded)
}

/// Build the router: adapters, devices, booleans, restored snapshot and
/// subscriptions.
///
/// The environment boolean is computed once from `daylight` without
/// publishing a change event. An unreadable snapshot is logged and the hub
/// starts from defaults.
///
/// # Errors
///
/// Returns [`HubError::Configuration`] for any inconsistency in `topology`,
/// or the error of an adapter factory.
pub async fn configure<S, D>(
    topology: Topology,
    kinds: &AdapterKinds,
    settings: RouterSettings,
    state_store: S,
    daylight: D,
) -> Result<Router<S, D>, HubError>
where
    S: StateStore,
    D: DaylightOracle,
{
    let fabric = InboundFabric::new();
    let groups = expand_device_groups(&topology.devices, &topology.device_groups)?;

    let mut adapters = AdapterTable::new();
    for config in topology.adapters.iter().chain(&groups.adapters) {
        if adapters.contains(config.id.as_str()) {
            return Err(ConfigurationError::DuplicateAdapter(config.id.to_string()).into());
        }
        adapters.insert(kinds.build(config, fabric.sender())?)?;
        tracing::debug!(adapter = %config.id, kind = %config.kind, "adapter ready");
    }

    let mut registry = DeviceRegistry::new();
    let devices = topology.devices.into_iter().map(Device::new);
    for device in devices.chain(groups.devices) {
        if !adapters.contains(device.config.adapter.as_str()) {
            return Err(ConfigurationError::UnknownAdapter {
                device: device.id().to_string(),
                adapter: device.config.adapter.to_string(),
            }
            .into());
        }
        registry.insert(device)?;
    }

    match state_store.load().await {
        Ok(statefile) => registry.restore(&statefile),
        Err(err) => tracing::error!(%err, "cannot read state snapshot, starting from defaults"),
    }

    let booleans = booleans(&topology.booleans, &settings, &daylight);

    let mut engine = AutomationEngine::new(settings.max_cascade_depth);
    for subscription in topology.subscriptions {
        engine.subscribe(subscription)?;
    }

    tracing::info!(
        adapters = adapters.len(),
        devices = registry.len(),
        subscriptions = engine.len(),
        "hub configured"
    );
    Ok(Router {
        registry,
        booleans,
        adapters,
        engine,
        fabric,
        state_store,
        daylight,
        settings,
    })
}

fn booleans<D: DaylightOracle>(
    configured: &[BooleanConfig],
    settings: &RouterSettings,
    daylight: &D,
) -> BooleanStore {
    let mut declared: Vec<(String, bool)> = if configured.is_empty() {
        vec![(DEFAULT_BOOLEAN.to_string(), true)]
    } else {
        let mut seen = HashSet::new();
        configured
            .iter()
            .filter(|boolean| seen.insert(boolean.name.as_str()))
            .map(|boolean| (boolean.name.clone(), boolean.initial))
            .collect()
    };
    let has_light = daylight.has_daylight(time::now(), &settings.location);
    declared.retain(|(name, _)| name != &settings.environment_boolean);
    declared.push((settings.environment_boolean.clone(), has_light));
    declared.into_iter().collect()
}
