//! Inbound events: what integrations report to, or request from, the hub.
//!
//! Every event is an immutable value. The set of kinds is closed so the
//! router matches on it exhaustively.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::{BatteryStatus, EnvironmentReading, Rgb};
use crate::id::DeviceId;

/// Requested power transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerKind {
    On,
    Off,
    Toggle,
}

impl PowerKind {
    /// Resolve into the target power flag given the current optimistic one.
    ///
    /// `Toggle` turns an off device on and an on device off.
    #[must_use]
    pub fn resolve(self, currently_on: bool) -> bool {
        match self {
            Self::On => true,
            Self::Off => false,
            Self::Toggle => !currently_on,
        }
    }
}

impl fmt::Display for PowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Toggle => "toggle",
        })
    }
}

/// An event entering the hub through the inbound fabric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Turn a device or group on, off, or flip it.
    Power { device: DeviceId, kind: PowerKind },
    Color { device: DeviceId, color: Rgb },
    ColorTemperature { device: DeviceId, kelvin: u16 },
    /// Brightness in percent.
    Brightness { device: DeviceId, brightness: u8 },
    Playback { device: DeviceId, action: String },
    Blink { device: DeviceId },
    /// Send an infrared command through the device's adapter.
    Infrared { device: DeviceId, command: String },
    /// An infrared remote button was received.
    RawInfrared { remote: String, event: String },
    PersonPresence { person: String, present: bool },
    Contact { device: DeviceId, contact: bool },
    PushButton { device: DeviceId, specifier: String },
    WaterLeak { device: DeviceId, detected: bool },
    LinkQuality { device: DeviceId, quality: u32 },
    BatteryStatus { device: DeviceId, status: BatteryStatus },
    EnvironmentReading {
        device: DeviceId,
        reading: EnvironmentReading,
    },
    /// Publish a named trigger event to the subscription engine.
    Publish { topic: String },
}

impl InboundEvent {
    /// Short, stable name of the event kind for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Power { .. } => "power",
            Self::Color { .. } => "color",
            Self::ColorTemperature { .. } => "color_temperature",
            Self::Brightness { .. } => "brightness",
            Self::Playback { .. } => "playback",
            Self::Blink { .. } => "blink",
            Self::Infrared { .. } => "infrared",
            Self::RawInfrared { .. } => "raw_infrared",
            Self::PersonPresence { .. } => "person_presence",
            Self::Contact { .. } => "contact",
            Self::PushButton { .. } => "push_button",
            Self::WaterLeak { .. } => "water_leak",
            Self::LinkQuality { .. } => "link_quality",
            Self::BatteryStatus { .. } => "battery_status",
            Self::EnvironmentReading { .. } => "environment_reading",
            Self::Publish { .. } => "publish",
        }
    }

    /// Convenience constructor for a power request.
    #[must_use]
    pub fn power(device: impl Into<DeviceId>, kind: PowerKind) -> Self {
        Self::Power {
            device: device.into(),
            kind,
        }
    }
}
