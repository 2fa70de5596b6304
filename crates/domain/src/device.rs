//! Device: a physical or virtual thing the hub can command or hear from.
//!
//! A [`Device`] couples its static [`DeviceConfig`] with the *optimistic*
//! runtime state the hub keeps for it: whatever was last commanded, never
//! anything confirmed by the hardware. Only the power flag and the last
//! color survive a restart, through [`DeviceSnapshot`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HubError;
use crate::id::{AdapterId, DeviceId};
use crate::time::Timestamp;

/// Something a device can be asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Power,
    Brightness,
    Color,
    ColorTemperature,
    Playback,
    Blink,
    Infrared,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Power => "power",
            Self::Brightness => "brightness",
            Self::Color => "color",
            Self::ColorTemperature => "color temperature",
            Self::Playback => "playback",
            Self::Blink => "blink",
            Self::Infrared => "infrared",
        })
    }
}

/// Kind of device, which determines its capability set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Unclassified device; every command is passed through.
    #[default]
    Generic,
    Switch,
    Light,
    ColorLight,
    MediaPlayer,
    /// Report-only device such as a contact or climate sensor.
    Sensor,
}

impl DeviceType {
    /// Whether devices of this type accept commands for `capability`.
    #[must_use]
    pub fn supports(self, capability: Capability) -> bool {
        use Capability as C;
        match self {
            Self::Generic => true,
            Self::Switch => matches!(capability, C::Power),
            Self::Light => matches!(capability, C::Power | C::Brightness | C::Blink),
            Self::ColorLight => matches!(
                capability,
                C::Power | C::Brightness | C::Color | C::ColorTemperature | C::Blink
            ),
            Self::MediaPlayer => matches!(capability, C::Power | C::Playback | C::Infrared),
            Self::Sensor => false,
        }
    }
}

/// An 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const WHITE: Self = Self {
        red: 255,
        green: 255,
        blue: 255,
    };

    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// Static, configuration-provided description of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub id: DeviceId,
    #[serde(rename = "type", default)]
    pub device_type: DeviceType,
    /// Adapter that commands this device.
    pub adapter: AdapterId,
    /// How the adapter itself names the device. Defaults to [`id`](Self::id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapters_device_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub power_on_cmd: String,
    #[serde(default)]
    pub power_off_cmd: String,
    /// Free-form category tag (e.g. a voice assistant display category).
    #[serde(default, alias = "alexa_category", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Battery report from a wireless device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryStatus {
    pub percent: u32,
    pub voltage_mv: u32,
}

/// Climate reading from a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentReading {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}

/// A single mutation of a device's runtime state.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeUpdate {
    Power(bool),
    Color(Rgb),
    LinkQuality(u32),
    Battery(BatteryStatus),
    Reading(EnvironmentReading),
    Seen(Timestamp),
}

/// The persisted part of a device's runtime state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub probably_turned_on: bool,
    pub last_color: Rgb,
}

impl Default for DeviceSnapshot {
    fn default() -> Self {
        Self {
            probably_turned_on: false,
            last_color: Rgb::WHITE,
        }
    }
}

/// On-disk document holding every device snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statefile {
    #[serde(default)]
    pub devices: BTreeMap<DeviceId, DeviceSnapshot>,
}

/// A configured device plus its optimistic runtime state.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub config: DeviceConfig,
    /// Member devices when this device is a group, empty otherwise.
    pub members: Vec<DeviceId>,
    pub probably_turned_on: bool,
    pub last_color: Rgb,
    pub link_quality: Option<u32>,
    pub battery: Option<BatteryStatus>,
    pub last_reading: Option<EnvironmentReading>,
    pub last_online: Option<Timestamp>,
}

impl Device {
    /// Create a device in its default state (off, white).
    #[must_use]
    pub fn new(config: DeviceConfig) -> Self {
        let defaults = DeviceSnapshot::default();
        Self {
            config,
            members: Vec::new(),
            probably_turned_on: defaults.probably_turned_on,
            last_color: defaults.last_color,
            link_quality: None,
            battery: None,
            last_reading: None,
            last_online: None,
        }
    }

    /// Create a virtual device that fans out to `members`.
    #[must_use]
    pub fn group(config: DeviceConfig, members: Vec<DeviceId>) -> Self {
        Self {
            members,
            ..Self::new(config)
        }
    }

    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.config.id
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        !self.members.is_empty()
    }

    /// The identifier the adapter uses for this device.
    #[must_use]
    pub fn adapter_device_id(&self) -> &str {
        self.config
            .adapters_device_id
            .as_deref()
            .unwrap_or_else(|| self.config.id.as_str())
    }

    /// Fail unless this device's type allows `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UnsupportedCapability`] when the type does not
    /// list the capability.
    pub fn ensure_supports(&self, capability: Capability) -> Result<(), HubError> {
        if self.config.device_type.supports(capability) {
            Ok(())
        } else {
            Err(HubError::UnsupportedCapability {
                device: self.config.id.to_string(),
                capability,
            })
        }
    }

    /// Apply a runtime mutation.
    pub fn apply(&mut self, update: RuntimeUpdate) {
        match update {
            RuntimeUpdate::Power(on) => self.probably_turned_on = on,
            RuntimeUpdate::Color(color) => self.last_color = color,
            RuntimeUpdate::LinkQuality(quality) => self.link_quality = Some(quality),
            RuntimeUpdate::Battery(status) => self.battery = Some(status),
            RuntimeUpdate::Reading(reading) => self.last_reading = Some(reading),
            RuntimeUpdate::Seen(at) => self.last_online = Some(at),
        }
    }

    /// Capture the persisted fields.
    #[must_use]
    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            probably_turned_on: self.probably_turned_on,
            last_color: self.last_color,
        }
    }

    /// Overwrite the persisted fields from a snapshot.
    pub fn restore(&mut self, snapshot: &DeviceSnapshot) {
        self.probably_turned_on = snapshot.probably_turned_on;
        self.last_color = snapshot.last_color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(id: &str, device_type: DeviceType) -> DeviceConfig {
        DeviceConfig {
            id: DeviceId::from(id),
            device_type,
            adapter: AdapterId::from("virtual"),
            adapters_device_id: None,
            name: id.to_string(),
            description: String::new(),
            power_on_cmd: "on".to_string(),
            power_off_cmd: "off".to_string(),
            category: None,
        }
    }

    #[test]
    fn should_start_off_and_white() {
        let device = Device::new(config("lamp", DeviceType::Light));
        assert!(!device.probably_turned_on);
        assert_eq!(device.last_color, Rgb::WHITE);
        assert!(device.last_online.is_none());
    }

    #[test]
    fn should_fall_back_to_device_id_for_adapter_device_id() {
        let device = Device::new(config("lamp", DeviceType::Light));
        assert_eq!(device.adapter_device_id(), "lamp");

        let mut cfg = config("lamp", DeviceType::Light);
        cfg.adapters_device_id = Some("65539".to_string());
        assert_eq!(Device::new(cfg).adapter_device_id(), "65539");
    }

    #[test]
    fn should_report_group_only_when_members_present() {
        let plain = Device::new(config("lamp", DeviceType::Light));
        let group = Device::group(
            config("all", DeviceType::Light),
            vec![DeviceId::from("lamp")],
        );
        assert!(!plain.is_group());
        assert!(group.is_group());
    }

    #[test]
    fn should_reject_brightness_on_switch() {
        let device = Device::new(config("plug", DeviceType::Switch));
        let result = device.ensure_supports(Capability::Brightness);
        assert!(matches!(
            result,
            Err(HubError::UnsupportedCapability {
                capability: Capability::Brightness,
                ..
            })
        ));
        assert!(device.ensure_supports(Capability::Power).is_ok());
    }

    #[test]
    fn should_support_everything_when_generic() {
        let device = Device::new(config("thing", DeviceType::Generic));
        assert!(device.ensure_supports(Capability::Playback).is_ok());
        assert!(device.ensure_supports(Capability::Color).is_ok());
    }

    #[test]
    fn should_restore_persisted_fields_only() {
        let mut device = Device::new(config("lamp", DeviceType::ColorLight));
        device.apply(RuntimeUpdate::LinkQuality(80));
        device.restore(&DeviceSnapshot {
            probably_turned_on: true,
            last_color: Rgb::new(10, 20, 30),
        });
        assert!(device.probably_turned_on);
        assert_eq!(device.last_color, Rgb::new(10, 20, 30));
        assert_eq!(device.link_quality, Some(80));
    }

    #[test]
    fn should_apply_runtime_updates() {
        let mut device = Device::new(config("sensor", DeviceType::Sensor));
        device.apply(RuntimeUpdate::Battery(BatteryStatus {
            percent: 90,
            voltage_mv: 3000,
        }));
        device.apply(RuntimeUpdate::Power(true));
        assert_eq!(device.battery.map(|b| b.percent), Some(90));
        assert!(device.probably_turned_on);
    }

    #[test]
    fn should_deserialize_device_type_and_category_alias() {
        let json = serde_json::json!({
            "id": "tv",
            "type": "mediaplayer",
            "adapter": "harmony",
            "name": "TV",
            "alexa_category": "TV"
        });
        let cfg: DeviceConfig = serde_json::from_value(json).unwrap();
        assert_eq!(cfg.device_type, DeviceType::MediaPlayer);
        assert_eq!(cfg.category.as_deref(), Some("TV"));
        assert!(cfg.power_on_cmd.is_empty());
    }

    #[test]
    fn should_serialize_statefile_with_color_components() {
        let mut statefile = Statefile::default();
        statefile.devices.insert(
            DeviceId::from("lamp"),
            DeviceSnapshot {
                probably_turned_on: true,
                last_color: Rgb::new(1, 2, 3),
            },
        );
        let json = serde_json::to_value(&statefile).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "devices": {
                    "lamp": {
                        "probably_turned_on": true,
                        "last_color": {"red": 1, "green": 2, "blue": 3}
                    }
                }
            })
        );
    }

    #[test]
    fn should_display_color_as_hex() {
        assert_eq!(Rgb::new(255, 0, 16).to_string(), "#ff0010");
    }
}
