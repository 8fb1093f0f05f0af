// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OpenRGB bridge - RGB controllers as home-automation lights.
//!
//! This library discovers RGB controllers exposed by one or more OpenRGB SDK
//! servers and presents each of them as a dimmable, color-capable light
//! accessory with On, Hue, Saturation and Brightness characteristics.
//!
//! # Supported Features
//!
//! - **Discovery**: Periodic discovery across servers with stable accessory identities
//! - **Light control**: Power and HSV color, applied uniformly to every LED
//! - **Power memory**: Switching a light back on restores its last color and mode
//! - **Host integration**: Lifecycle events and serializable accessory records
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use openrgb_bridge::event::AccessoryEvent;
//! use openrgb_bridge::manager::{Platform, PlatformConfig};
//! use openrgb_bridge::protocol::OpenRgbConnector;
//!
//! #[tokio::main]
//! async fn main() -> openrgb_bridge::Result<()> {
//!     let config = PlatformConfig::from_file("config.json")?;
//!     let connector = OpenRgbConnector::new(config.name.clone());
//!     let platform = Arc::new(Platform::new(config, connector));
//!
//!     let mut events = platform.subscribe();
//!     let _discovery = platform.start();
//!
//!     while let Ok(event) = events.recv().await {
//!         if let AccessoryEvent::Registered { id, .. } = event {
//!             if let Some(light) = platform.accessory(id).await {
//!                 light.set_on(true).await;
//!                 light.set_hue(120).await;
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! - `tcp` (default): the OpenRGB SDK TCP client, [`protocol::OpenRgbConnector`]

pub mod accessory;
pub mod controller;
pub mod error;
pub mod event;
pub mod manager;
pub mod protocol;
pub mod session;
pub mod state;
pub mod types;

pub use accessory::{AccessoryInformation, AccessoryRecord, LightAccessory};
pub use controller::{ControllerMode, ControllerSnapshot};
pub use error::{ConfigError, Error, ProtocolError, Result};
pub use event::{AccessoryEvent, AccessoryId};
pub use manager::{DiscoveryReport, Platform, PlatformConfig, ServerConfig};
pub use state::{AccessoryState, StateChange};
pub use types::{HsvColor, RgbColor};
