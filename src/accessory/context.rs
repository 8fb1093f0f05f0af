// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-accessory context and the records hosts persist.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::controller::ControllerSnapshot;
use crate::event::AccessoryId;
use crate::manager::ServerConfig;
use crate::types::RgbColor;

/// Name used when a controller reports an empty name.
pub const DEFAULT_DEVICE_NAME: &str = "Unknown Device";

const DEFAULT_MANUFACTURER: &str = "OpenRGB";
const DEFAULT_SERIAL_NUMBER: &str = "9876543210";

/// Everything the bridge remembers about one accessory.
///
/// The last-powered values survive the device being switched off, so
/// turning it back on restores the color and mode it had before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryContext {
    /// The most recent snapshot seen during discovery.
    pub device: ControllerSnapshot,
    /// The server reporting the controller.
    pub server: ServerConfig,
    /// Last non-black color the device showed or was set to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_powered_rgb_color: Option<RgbColor>,
    /// Last mode other than "Off" the device was in or was set to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_powered_mode_id: Option<u32>,
    /// When discovery last saw the controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_discovered: Option<DateTime<Utc>>,
}

impl AccessoryContext {
    /// Creates a context without last-powered memory.
    #[must_use]
    pub fn new(device: ControllerSnapshot, server: ServerConfig) -> Self {
        Self {
            device,
            server,
            last_powered_rgb_color: None,
            last_powered_mode_id: None,
            last_discovered: None,
        }
    }

    /// Replaces the snapshot and server after a discovery cycle saw the device.
    pub fn refresh(&mut self, device: ControllerSnapshot, server: ServerConfig) {
        self.device = device;
        self.server = server;
        self.last_discovered = Some(Utc::now());
    }
}

/// Context shared between the registry and the accessory handler.
pub type SharedContext = Arc<RwLock<AccessoryContext>>;

/// A persisted accessory.
///
/// Hosts store records between runs and hand them back through
/// [`Platform::configure_accessory`](crate::manager::Platform::configure_accessory)
/// before the first discovery cycle.
///
/// # Examples
///
/// ```
/// use openrgb_bridge::accessory::AccessoryRecord;
/// use openrgb_bridge::controller::ControllerSnapshot;
/// use openrgb_bridge::manager::ServerConfig;
///
/// let device = ControllerSnapshot::new(0, "Desk Strip").with_serial("S1");
/// let record = AccessoryRecord::new(device.clone(), ServerConfig::new("PC", "pc.local", 6742));
///
/// assert_eq!(record.id, device.identity());
/// assert_eq!(record.display_name, "Desk Strip");
///
/// let json = serde_json::to_string(&record).unwrap();
/// let restored: AccessoryRecord = serde_json::from_str(&json).unwrap();
/// assert_eq!(restored, record);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryRecord {
    /// Stable accessory identity.
    pub id: AccessoryId,
    /// Name shown by the host.
    pub display_name: String,
    /// Accessory context.
    pub context: AccessoryContext,
}

impl AccessoryRecord {
    /// Creates a record for a newly discovered controller.
    #[must_use]
    pub fn new(device: ControllerSnapshot, server: ServerConfig) -> Self {
        Self {
            id: device.identity(),
            display_name: display_name(&device),
            context: AccessoryContext::new(device, server),
        }
    }
}

/// Returns the name an accessory for `device` is shown under.
#[must_use]
pub fn display_name(device: &ControllerSnapshot) -> String {
    if device.name.is_empty() {
        DEFAULT_DEVICE_NAME.to_string()
    } else {
        device.name.clone()
    }
}

/// Static accessory information shown by hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryInformation {
    /// Accessory name.
    pub name: String,
    /// First word of the controller description.
    pub manufacturer: String,
    /// Controller name.
    pub model: String,
    /// Controller serial.
    pub serial_number: String,
}

impl AccessoryInformation {
    /// Derives the information from a snapshot, filling in defaults for empty fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use openrgb_bridge::accessory::AccessoryInformation;
    /// use openrgb_bridge::controller::ControllerSnapshot;
    ///
    /// let device = ControllerSnapshot::new(0, "Vengeance RGB")
    ///     .with_description("Corsair Vengeance RGB DRAM");
    /// let info = AccessoryInformation::from_snapshot(&device);
    ///
    /// assert_eq!(info.manufacturer, "Corsair");
    /// assert_eq!(info.model, "Vengeance RGB");
    /// assert_eq!(info.serial_number, "9876543210");
    /// ```
    #[must_use]
    pub fn from_snapshot(device: &ControllerSnapshot) -> Self {
        let manufacturer = device
            .description
            .split(' ')
            .next()
            .filter(|word| !word.is_empty())
            .unwrap_or(DEFAULT_MANUFACTURER);
        let serial_number = if device.serial.is_empty() {
            DEFAULT_SERIAL_NUMBER
        } else {
            &device.serial
        };

        Self {
            name: display_name(device),
            manufacturer: manufacturer.to_string(),
            model: display_name(device),
            serial_number: serial_number.to_string(),
        }
    }
}
