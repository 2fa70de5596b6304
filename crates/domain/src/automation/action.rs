//! Action: the effect performed when a subscription fires.

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;

/// An operation executed, in order, when a subscription's trigger is
/// published and all of its conditions hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "camelCase")]
pub enum Action {
    /// Re-enter the fabric with a power-on request.
    PowerOn { device: DeviceId },
    PowerOff { device: DeviceId },
    PowerToggle { device: DeviceId },
    Blink { device: DeviceId },
    /// Send an infrared command straight to the device's adapter.
    Ir { device: DeviceId, ir_command: String },
    /// Send a playback command straight to the device's adapter.
    Playback {
        device: DeviceId,
        playback_action: String,
    },
    SetBooleanTrue { boolean: String },
    SetBooleanFalse { boolean: String },
    /// Hold the router for a number of seconds before the next action.
    Sleep { duration_seconds: u64 },
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PowerOn { device } => write!(f, "powerOn({device})"),
            Self::PowerOff { device } => write!(f, "powerOff({device})"),
            Self::PowerToggle { device } => write!(f, "powerToggle({device})"),
            Self::Blink { device } => write!(f, "blink({device})"),
            Self::Ir { device, ir_command } => write!(f, "ir({device}, {ir_command})"),
            Self::Playback {
                device,
                playback_action,
            } => write!(f, "playback({device}, {playback_action})"),
            Self::SetBooleanTrue { boolean } => write!(f, "setBooleanTrue({boolean})"),
            Self::SetBooleanFalse { boolean } => write!(f, "setBooleanFalse({boolean})"),
            Self::Sleep { duration_seconds } => write!(f, "sleep({duration_seconds}s)"),
        }
    }
}
