// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-in-time controller state as reported by an OpenRGB SDK server.

use serde::{Deserialize, Serialize};

use crate::event::AccessoryId;
use crate::types::RgbColor;

use super::mode::{self, DIRECT_MODE, OFF_MODE};

/// A controller as reported by one server during one connection.
///
/// `device_id` is the controller's index on the server for the current
/// connection only; it is not stable across reconnects. Use
/// [`identity`](Self::identity) to get a stable key.
///
/// # Examples
///
/// ```
/// use openrgb_bridge::controller::{ControllerMode, ControllerSnapshot};
/// use openrgb_bridge::types::RgbColor;
///
/// let snapshot = ControllerSnapshot::new(0, "Desk Strip")
///     .with_modes(vec![ControllerMode::new(0, "Direct"), ControllerMode::new(1, "Off")])
///     .with_active_mode(0)
///     .with_uniform_color(30, RgbColor::new(255, 0, 0));
///
/// assert!(snapshot.is_powered_on());
/// assert_eq!(snapshot.off_mode_id(), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSnapshot {
    /// Session-local controller index on the server.
    pub device_id: u32,
    /// OpenRGB device type code.
    #[serde(default)]
    pub device_type: i32,
    /// Controller name.
    pub name: String,
    /// Free-form description, usually starting with the vendor.
    #[serde(default)]
    pub description: String,
    /// Firmware or driver version.
    #[serde(default)]
    pub version: String,
    /// Serial number, often empty.
    #[serde(default)]
    pub serial: String,
    /// Bus location, e.g. `HID: /dev/hidraw3`.
    #[serde(default)]
    pub location: String,
    /// Id of the currently active mode, if the controller reports one.
    #[serde(default)]
    pub active_mode: Option<u32>,
    /// One color per LED.
    #[serde(default)]
    pub colors: Vec<RgbColor>,
    /// Modes the controller declares.
    #[serde(default)]
    pub modes: Vec<ControllerMode>,
}

impl ControllerSnapshot {
    /// Creates a snapshot with no LEDs and no modes.
    #[must_use]
    pub fn new(device_id: u32, name: impl Into<String>) -> Self {
        Self {
            device_id,
            device_type: 0,
            name: name.into(),
            description: String::new(),
            version: String::new(),
            serial: String::new(),
            location: String::new(),
            active_mode: None,
            colors: Vec::new(),
            modes: Vec::new(),
        }
    }

    /// Sets the serial number.
    #[must_use]
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = serial.into();
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the declared modes.
    #[must_use]
    pub fn with_modes(mut self, modes: Vec<ControllerMode>) -> Self {
        self.modes = modes;
        self
    }

    /// Sets the active mode id.
    #[must_use]
    pub fn with_active_mode(mut self, mode_id: u32) -> Self {
        self.active_mode = Some(mode_id);
        self
    }

    /// Gives the controller `led_count` LEDs, all showing `color`.
    #[must_use]
    pub fn with_uniform_color(mut self, led_count: usize, color: RgbColor) -> Self {
        self.colors = vec![color; led_count];
        self
    }

    /// Returns the stable identity of this controller.
    #[must_use]
    pub fn identity(&self) -> AccessoryId {
        AccessoryId::derive(&self.name, &self.serial, &self.location)
    }

    /// Returns the color of the first LED, or black when the controller has no LEDs.
    ///
    /// All LEDs of a controller are assumed to show the same color.
    #[must_use]
    pub fn current_rgb_color(&self) -> RgbColor {
        self.colors.first().copied().unwrap_or_else(RgbColor::black)
    }

    /// Returns `true` unless the LEDs are black or the controller is in its Off mode.
    #[must_use]
    pub fn is_powered_on(&self) -> bool {
        if self.current_rgb_color().is_off() {
            return false;
        }
        match (self.active_mode, self.off_mode_id()) {
            (Some(active), Some(off)) => active != off,
            _ => true,
        }
    }

    /// Looks up a mode id by name. See [`find_mode_id`](super::find_mode_id).
    #[must_use]
    pub fn mode_id(&self, name: &str) -> Option<u32> {
        mode::find_mode_id(self, name)
    }

    /// Returns the id of the controller's "Off" mode, if declared.
    #[must_use]
    pub fn off_mode_id(&self) -> Option<u32> {
        self.mode_id(OFF_MODE)
    }

    /// Returns the id of the controller's "Direct" mode, if declared.
    #[must_use]
    pub fn direct_mode_id(&self) -> Option<u32> {
        self.mode_id(DIRECT_MODE)
    }

    /// Returns the declared mode with the given id.
    #[must_use]
    pub fn mode(&self, mode_id: u32) -> Option<&ControllerMode> {
        self.modes.iter().find(|m| m.id == mode_id)
    }
}

/// A mode declared by a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerMode {
    /// Index of the mode in the controller's mode list.
    pub id: u32,
    /// Mode name as reported by the controller.
    pub name: String,
    /// Remaining mode parameters, sent back verbatim when the mode is activated.
    #[serde(default)]
    pub settings: ModeSettings,
}

impl ControllerMode {
    /// Creates a mode with default settings.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            settings: ModeSettings::default(),
        }
    }
}

/// Mode parameters of the OpenRGB mode description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModeSettings {
    /// Device-specific mode value.
    pub value: i32,
    /// Mode capability flags.
    pub flags: u32,
    /// Slowest supported effect speed.
    pub speed_min: u32,
    /// Fastest supported effect speed.
    pub speed_max: u32,
    /// Minimum number of mode colors.
    pub colors_min: u32,
    /// Maximum number of mode colors.
    pub colors_max: u32,
    /// Current effect speed.
    pub speed: u32,
    /// Current effect direction.
    pub direction: u32,
    /// How the mode sources its colors.
    pub color_mode: u32,
    /// Mode-specific colors.
    pub colors: Vec<RgbColor>,
}

/// Finds the snapshot whose identity matches `id`.
///
/// Returns `None` when the controller is no longer reported by the server,
/// e.g. because it was unplugged. Callers treat that as a no-op.
#[must_use]
pub fn resolve(snapshots: &[ControllerSnapshot], id: AccessoryId) -> Option<&ControllerSnapshot> {
    snapshots.iter().find(|snapshot| snapshot.identity() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip() -> ControllerSnapshot {
        ControllerSnapshot::new(0, "Desk Strip")
            .with_serial("S1")
            .with_location("HID: /dev/hidraw1")
            .with_modes(vec![
                ControllerMode::new(0, "Direct"),
                ControllerMode::new(1, "Static"),
                ControllerMode::new(2, "Off"),
            ])
            .with_active_mode(0)
            .with_uniform_color(8, RgbColor::new(0, 128, 255))
    }

    #[test]
    fn identity_ignores_session_index() {
        let a = strip();
        let mut b = strip();
        b.device_id = 7;
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn resolve_finds_matching_identity() {
        let other = ControllerSnapshot::new(0, "Keyboard").with_location("HID: /dev/hidraw2");
        let mut target = strip();
        target.device_id = 1;
        let snapshots = vec![other, target.clone()];

        let found = resolve(&snapshots, target.identity()).unwrap();
        assert_eq!(found.device_id, 1);
    }

    #[test]
    fn resolve_returns_none_for_vanished_device() {
        let snapshots = vec![ControllerSnapshot::new(0, "Keyboard")];
        assert!(resolve(&snapshots, strip().identity()).is_none());
        assert!(resolve(&[], strip().identity()).is_none());
    }

    #[test]
    fn current_color_is_first_led() {
        let mut snapshot = strip();
        snapshot.colors[1] = RgbColor::white();
        assert_eq!(snapshot.current_rgb_color(), RgbColor::new(0, 128, 255));
    }

    #[test]
    fn current_color_defaults_to_black() {
        let snapshot = ControllerSnapshot::new(0, "No LEDs");
        assert_eq!(snapshot.current_rgb_color(), RgbColor::black());
        assert!(!snapshot.is_powered_on());
    }

    #[test]
    fn powered_on_requires_color_and_non_off_mode() {
        assert!(strip().is_powered_on());

        let black = strip().with_uniform_color(8, RgbColor::black());
        assert!(!black.is_powered_on());

        let off_mode = strip().with_active_mode(2);
        assert!(!off_mode.is_powered_on());
    }

    #[test]
    fn powered_on_without_off_mode_uses_color_only() {
        let snapshot = ControllerSnapshot::new(0, "Fan")
            .with_modes(vec![ControllerMode::new(0, "Direct")])
            .with_uniform_color(4, RgbColor::white());
        assert!(snapshot.is_powered_on());
    }

    #[test]
    fn well_known_modes() {
        let snapshot = strip();
        assert_eq!(snapshot.direct_mode_id(), Some(0));
        assert_eq!(snapshot.off_mode_id(), Some(2));
        assert_eq!(snapshot.mode(1).map(|m| m.name.as_str()), Some("Static"));
        assert!(snapshot.mode(9).is_none());
    }

    #[test]
    fn deserializes_with_missing_optional_fields() {
        let json = r#"{ "deviceId": 3, "name": "Mouse" }"#;
        let snapshot: ControllerSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.device_id, 3);
        assert!(snapshot.modes.is_empty());
        assert!(snapshot.active_mode.is_none());
    }
}
