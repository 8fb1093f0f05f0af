// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory registration events.

use super::AccessoryId;

/// Events emitted by the platform when its accessory registry changes.
///
/// These are the host framework's register / update / unregister calls in
/// event form: a host subscribes and mirrors each event into its own
/// accessory database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessoryEvent {
    /// A new accessory was created and should be registered with the host.
    Registered {
        /// The accessory identifier.
        id: AccessoryId,
        /// Name to show for the accessory.
        display_name: String,
    },

    /// An existing accessory received a fresh device snapshot and server.
    Updated {
        /// The accessory identifier.
        id: AccessoryId,
    },

    /// An accessory was removed and should be unregistered from the host.
    Unregistered {
        /// The accessory identifier.
        id: AccessoryId,
        /// Name the accessory was shown with.
        display_name: String,
    },
}

impl AccessoryEvent {
    /// Returns the accessory ID associated with this event.
    #[must_use]
    pub fn id(&self) -> AccessoryId {
        match self {
            Self::Registered { id, .. } | Self::Updated { id } | Self::Unregistered { id, .. } => {
                *id
            }
        }
    }

    /// Creates a registered event.
    #[must_use]
    pub fn registered(id: AccessoryId, display_name: impl Into<String>) -> Self {
        Self::Registered {
            id,
            display_name: display_name.into(),
        }
    }

    /// Creates an updated event.
    #[must_use]
    pub fn updated(id: AccessoryId) -> Self {
        Self::Updated { id }
    }

    /// Creates an unregistered event.
    #[must_use]
    pub fn unregistered(id: AccessoryId, display_name: impl Into<String>) -> Self {
        Self::Unregistered {
            id,
            display_name: display_name.into(),
        }
    }
}
