//! Outbound dispatch: turning a request for a device into adapter commands.
//!
//! A request for a group is fanned out to every member; a member that cannot
//! take the command is logged and the rest still receive it.

use homehub_domain::command::OutboundCommand;
use homehub_domain::device::{Capability, Device};
use homehub_domain::error::HubError;

use crate::adapter_table::AdapterTable;
use crate::device_registry::DeviceRegistry;

/// Send the command built by `command` to `device`, or to each member when
/// `device` is a group.
///
/// # Errors
///
/// For a single device, returns the lookup, capability or adapter error.
/// A group only fails when the group itself is unknown.
pub fn send<F>(
    registry: &DeviceRegistry,
    adapters: &AdapterTable,
    device: &str,
    capability: Capability,
    command: F,
) -> Result<(), HubError>
where
    F: Fn(&Device) -> OutboundCommand,
{
    let target = registry.lookup(device)?;
    if !target.is_group() {
        return send_one(adapters, target, capability, &command);
    }
    for member in &target.members {
        let result = registry
            .lookup(member.as_str())
            .and_then(|member| send_one(adapters, member, capability, &command));
        if let Err(err) = result {
            tracing::warn!(%err, group = %device, device = %member, "group member rejected command");
        }
    }
    Ok(())
}

/// Send to exactly one physical device.
///
/// # Errors
///
/// Returns [`HubError::UnsupportedCapability`], [`HubError::UnknownAdapter`]
/// or whatever the adapter rejects the command with.
pub fn send_one<F>(
    adapters: &AdapterTable,
    device: &Device,
    capability: Capability,
    command: F,
) -> Result<(), HubError>
where
    F: Fn(&Device) -> OutboundCommand,
{
    device.ensure_supports(capability)?;
    let adapter = adapters.lookup(device.config.adapter.as_str())?;
    let command = command(device);
    tracing::debug!(device = %device.id(), adapter = %adapter.id(), %command, "dispatching command");
    adapter.send(command)
}
