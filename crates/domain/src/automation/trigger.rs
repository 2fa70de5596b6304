//! Trigger: names of the events subscriptions can listen to.
//!
//! Triggers are plain strings (`contact:frontdoor:true`). These helpers are
//! the single place where the hub spells them.

use std::fmt::Display;

/// `boolean:<name>:changes-to-true` / `boolean:<name>:changes-to-false`.
#[must_use]
pub fn boolean_changed(name: &str, value: bool) -> String {
    format!("boolean:{name}:changes-to-{value}")
}

/// `contact:<device>:<true|false>`.
#[must_use]
pub fn contact(device: impl Display, contact: bool) -> String {
    format!("contact:{device}:{contact}")
}

/// `pushbutton:<device>:<specifier>`.
#[must_use]
pub fn push_button(device: impl Display, specifier: &str) -> String {
    format!("pushbutton:{device}:{specifier}")
}

/// `waterleak:<device>:<true|false>`.
#[must_use]
pub fn water_leak(device: impl Display, detected: bool) -> String {
    format!("waterleak:{device}:{detected}")
}

/// `infrared:<remote>:<event>`.
#[must_use]
pub fn infrared(remote: &str, event: &str) -> String {
    format!("infrared:{remote}:{event}")
}

/// `presence:<person>:<true|false>`.
#[must_use]
pub fn presence(person: &str, present: bool) -> String {
    format!("presence:{person}:{present}")
}

/// `device:<device>:power:<on|off>`.
#[must_use]
pub fn device_power(device: impl Display, on: bool) -> String {
    let state = if on { "on" } else { "off" };
    format!("device:{device}:power:{state}")
}
