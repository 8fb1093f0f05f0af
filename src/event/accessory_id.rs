// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stable accessory identifier.

use std::fmt;

use uuid::Uuid;

/// Namespace for name-based accessory UUIDs.
const ACCESSORY_NAMESPACE: Uuid = Uuid::from_u128(0x6f70_656e_7267_4262_9a1d_7e3c_51b2_d0c4);

/// Stable identifier for a light accessory.
///
/// OpenRGB only gives controllers a session-local index, which changes when
/// devices are added, removed, or the server restarts. The identifier is
/// therefore derived from what the controller reports about itself: a
/// UUID v5 over `"{name}-{serial}-{location}"`. The same device always maps
/// to the same identifier, across reconnects and process restarts.
///
/// # Examples
///
/// ```
/// use openrgb_bridge::event::AccessoryId;
///
/// let a = AccessoryId::derive("Aura Mainboard", "", "HID: /dev/hidraw3");
/// let b = AccessoryId::derive("Aura Mainboard", "", "HID: /dev/hidraw3");
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AccessoryId(Uuid);

impl AccessoryId {
    /// Derives the identifier for a controller from its name, serial, and location.
    #[must_use]
    pub fn derive(name: &str, serial: &str, location: &str) -> Self {
        let key = format!("{name}-{serial}-{location}");
        Self(Uuid::new_v5(&ACCESSORY_NAMESPACE, key.as_bytes()))
    }

    /// Creates an identifier from an existing UUID, e.g. one read back from a cache.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for AccessoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Show only first 8 characters for readability
        let full = self.0.to_string();
        write!(f, "AccessoryId({}...)", &full[..8])
    }
}

impl fmt::Display for AccessoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for AccessoryId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<AccessoryId> for Uuid {
    fn from(id: AccessoryId) -> Self {
        id.0
    }
}
