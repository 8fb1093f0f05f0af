// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Platform configuration, discovery and the accessory registry.
//!
//! # Overview
//!
//! The [`Platform`] is the central component hosts talk to. It provides:
//!
//! - **Discovery**: Reads every configured server, once or periodically
//! - **Registry**: One accessory per controller identity, restored from host records
//! - **Event system**: Lifecycle events via broadcast channels
//!
//! # Examples
//!
//! ## Restoring and discovering
//!
//! ```no_run
//! use openrgb_bridge::accessory::AccessoryRecord;
//! use openrgb_bridge::manager::{Platform, PlatformConfig};
//! use openrgb_bridge::protocol::OpenRgbConnector;
//!
//! # async fn example(cached: Vec<AccessoryRecord>) -> openrgb_bridge::Result<()> {
//! let config = PlatformConfig::from_file("config.json")?;
//! let platform = Platform::new(config, OpenRgbConnector::new("OpenRGB"));
//!
//! for record in cached {
//!     platform.configure_accessory(record).await;
//! }
//!
//! let report = platform.discover_devices().await?;
//! println!("{} new, {} removed", report.registered, report.removed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Event Subscription
//!
//! ```no_run
//! use openrgb_bridge::event::AccessoryEvent;
//! use openrgb_bridge::manager::{Platform, PlatformConfig};
//! use openrgb_bridge::protocol::OpenRgbConnector;
//!
//! # fn example() {
//! let platform = Platform::new(PlatformConfig::default(), OpenRgbConnector::new("OpenRGB"));
//! let mut events = platform.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             AccessoryEvent::Registered { display_name, .. } => println!("register {display_name}"),
//!             AccessoryEvent::Unregistered { display_name, .. } => println!("unregister {display_name}"),
//!             AccessoryEvent::Updated { .. } => {}
//!         }
//!     }
//! });
//! # }
//! ```

mod managed_accessory;
mod platform;
mod platform_config;

pub use platform::{DiscoveryReport, Platform};
pub use platform_config::{PlatformConfig, ServerConfig};
