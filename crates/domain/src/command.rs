//! Outbound commands: what the hub asks an adapter to do.
//!
//! Devices are addressed by their *adapter-local* identifier; the adapter
//! never sees hub device ids.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::Rgb;

/// A single command handed to an adapter's `send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundCommand {
    /// Power change carrying the device's configured on/off command string.
    Power {
        device: String,
        command: String,
        on: bool,
    },
    Color {
        device: String,
        color: Rgb,
    },
    ColorTemperature {
        device: String,
        kelvin: u16,
    },
    /// Brightness in percent, with the color last commanded to the device.
    Brightness {
        device: String,
        brightness: u8,
        color: Rgb,
    },
    Playback {
        device: String,
        action: String,
    },
    Blink {
        device: String,
    },
    Infrared {
        device: String,
        command: String,
    },
}

impl OutboundCommand {
    /// Adapter-local identifier of the target device.
    #[must_use]
    pub fn device(&self) -> &str {
        match self {
            Self::Power { device, .. }
            | Self::Color { device, .. }
            | Self::ColorTemperature { device, .. }
            | Self::Brightness { device, .. }
            | Self::Playback { device, .. }
            | Self::Blink { device }
            | Self::Infrared { device, .. } => device,
        }
    }
}

impl fmt::Display for OutboundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Power {
                device, command, ..
            } => write!(f, "power({device}, {command})"),
            Self::Color { device, color } => write!(f, "color({device}, {color})"),
            Self::ColorTemperature { device, kelvin } => {
                write!(f, "color_temperature({device}, {kelvin}K)")
            }
            Self::Brightness {
                device, brightness, ..
            } => write!(f, "brightness({device}, {brightness}%)"),
            Self::Playback { device, action } => write!(f, "playback({device}, {action})"),
            Self::Blink { device } => write!(f, "blink({device})"),
            Self::Infrared { device, command } => write!(f, "infrared({device}, {command})"),
        }
    }
}
