// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Internal accessory wrapper for the platform registry.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::accessory::{AccessoryRecord, LightAccessory, SharedContext};
use crate::event::AccessoryId;
use crate::protocol::Connector;

use super::PlatformConfig;

/// Internal representation of an accessory in the registry.
pub(crate) struct ManagedAccessory<C: Connector> {
    /// Stable accessory identity.
    pub id: AccessoryId,
    /// Name the host shows.
    pub display_name: String,
    /// Context shared with the handler.
    pub context: SharedContext,
    /// Characteristic handler, attached on the first discovery that sees the device.
    pub handler: Option<Arc<LightAccessory<C>>>,
}

impl<C: Connector> ManagedAccessory<C> {
    /// Wraps a record without attaching a handler.
    pub fn from_record(record: AccessoryRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.display_name,
            context: Arc::new(RwLock::new(record.context)),
            handler: None,
        }
    }

    /// Returns the persisted form of the accessory.
    pub fn record(&self) -> AccessoryRecord {
        AccessoryRecord {
            id: self.id,
            display_name: self.display_name.clone(),
            context: self.context.read().clone(),
        }
    }

    /// Attaches a handler unless one is attached already.
    ///
    /// Returns `true` if a handler was attached.
    pub fn attach_handler(&mut self, connector: &Arc<C>, config: &PlatformConfig) -> bool {
        if self.handler.is_some() {
            return false;
        }
        let handler = LightAccessory::new(
            self.id,
            self.display_name.clone(),
            Arc::clone(&self.context),
            Arc::clone(connector),
        )
        .with_connection_timeout(config.connection_timeout())
        .with_update_delay(config.update_delay());
        self.handler = Some(Arc::new(handler));
        true
    }
}
