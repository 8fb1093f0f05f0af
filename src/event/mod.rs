// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory identity and registration events.
//!
//! The platform publishes an [`AccessoryEvent`] on its [`EventBus`] whenever
//! discovery registers, refreshes, or removes an accessory. Host frameworks
//! subscribe and mirror these into their own registry.
//!
//! # Examples
//!
//! ```
//! use openrgb_bridge::event::{AccessoryEvent, AccessoryId, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! let id = AccessoryId::derive("Desk Strip", "", "I2C: /dev/i2c-1");
//! bus.publish(AccessoryEvent::registered(id, "Desk Strip"));
//! ```

mod accessory_event;
mod accessory_id;
mod event_bus;

pub use accessory_event::AccessoryEvent;
pub use accessory_id::AccessoryId;
pub use event_bus::EventBus;
