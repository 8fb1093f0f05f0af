// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process OpenRGB servers.
//!
//! [`MemoryConnector`] resolves servers by `host:port` to [`MemoryServer`]s
//! living in the same process. Each server holds a list of controllers,
//! applies mode and LED writes to them, and records every write so callers
//! can inspect what reached the "device". Servers can be taken offline,
//! slowed down, or told to reject writes.
//!
//! # Examples
//!
//! ```
//! use openrgb_bridge::controller::{ControllerMode, ControllerSnapshot};
//! use openrgb_bridge::manager::ServerConfig;
//! use openrgb_bridge::protocol::MemoryConnector;
//!
//! let connector = MemoryConnector::new();
//! let server = connector.add_server(&ServerConfig::new("Desktop", "127.0.0.1", 6742));
//! server.add_controller(
//!     ControllerSnapshot::new(0, "Desk Strip")
//!         .with_modes(vec![ControllerMode::new(0, "Direct"), ControllerMode::new(1, "Off")]),
//! );
//! assert_eq!(server.controllers().len(), 1);
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::controller::ControllerSnapshot;
use crate::error::ProtocolError;
use crate::manager::ServerConfig;
use crate::types::RgbColor;

use super::{Connector, WireClient};

/// A write that reached a [`MemoryServer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    /// A mode change.
    Mode {
        /// Controller index.
        controller: u32,
        /// Activated mode id.
        mode_id: u32,
    },
    /// An LED color update.
    Leds {
        /// Controller index.
        controller: u32,
        /// The colors sent, one per LED.
        colors: Vec<RgbColor>,
    },
}

#[derive(Debug)]
struct ServerState {
    controllers: Vec<ControllerSnapshot>,
    online: bool,
    connect_delay: Option<Duration>,
    reply_delay: Option<Duration>,
    reject_mode_writes: bool,
    reject_led_writes: bool,
    writes: Vec<Write>,
    connections: usize,
    open_connections: usize,
}

/// An in-process OpenRGB server.
///
/// Clones share the same server state.
#[derive(Debug, Clone)]
pub struct MemoryServer {
    inner: Arc<Mutex<ServerState>>,
}

impl MemoryServer {
    /// Creates an online server without controllers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ServerState {
                controllers: Vec::new(),
                online: true,
                connect_delay: None,
                reply_delay: None,
                reject_mode_writes: false,
                reject_led_writes: false,
                writes: Vec::new(),
                connections: 0,
                open_connections: 0,
            })),
        }
    }

    /// Appends a controller; its `device_id` becomes its position on the server.
    pub fn add_controller(&self, snapshot: ControllerSnapshot) {
        self.inner.lock().controllers.push(snapshot);
    }

    /// Replaces all controllers.
    pub fn set_controllers(&self, controllers: Vec<ControllerSnapshot>) {
        self.inner.lock().controllers = controllers;
    }

    /// Removes the controller with the given name, as if it was unplugged.
    pub fn remove_controller(&self, name: &str) {
        self.inner.lock().controllers.retain(|c| c.name != name);
    }

    /// Returns the current controllers with their session indices.
    #[must_use]
    pub fn controllers(&self) -> Vec<ControllerSnapshot> {
        let state = self.inner.lock();
        (0u32..)
            .zip(state.controllers.iter())
            .map(|(index, controller)| ControllerSnapshot {
                device_id: index,
                ..controller.clone()
            })
            .collect()
    }

    /// Returns the controller with the given name.
    #[must_use]
    pub fn controller(&self, name: &str) -> Option<ControllerSnapshot> {
        self.controllers().into_iter().find(|c| c.name == name)
    }

    /// Takes the server offline or brings it back.
    pub fn set_online(&self, online: bool) {
        self.inner.lock().online = online;
    }

    /// Delays every connection attempt by `delay`.
    pub fn set_connect_delay(&self, delay: Option<Duration>) {
        self.inner.lock().connect_delay = delay;
    }

    /// Delays every controller count reply by `delay`, after the connection
    /// was accepted.
    pub fn set_reply_delay(&self, delay: Option<Duration>) {
        self.inner.lock().reply_delay = delay;
    }

    /// Makes mode writes fail.
    pub fn reject_mode_writes(&self, reject: bool) {
        self.inner.lock().reject_mode_writes = reject;
    }

    /// Makes LED writes fail.
    pub fn reject_led_writes(&self, reject: bool) {
        self.inner.lock().reject_led_writes = reject;
    }

    /// Returns every write received so far.
    #[must_use]
    pub fn writes(&self) -> Vec<Write> {
        self.inner.lock().writes.clone()
    }

    /// Forgets recorded writes.
    pub fn clear_writes(&self) {
        self.inner.lock().writes.clear();
    }

    /// Returns how many connections were accepted in total.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.inner.lock().connections
    }

    /// Returns how many accepted connections have not been closed.
    #[must_use]
    pub fn open_connections(&self) -> usize {
        self.inner.lock().open_connections
    }
}

impl Default for MemoryServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Connects to [`MemoryServer`]s by address.
///
/// Connecting to an address without a server fails like a refused TCP
/// connection.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    servers: Arc<Mutex<HashMap<String, MemoryServer>>>,
}

impl MemoryConnector {
    /// Creates a connector without servers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the server listening at `server`'s address, creating it if needed.
    pub fn add_server(&self, server: &ServerConfig) -> MemoryServer {
        self.servers
            .lock()
            .entry(server.address())
            .or_default()
            .clone()
    }

    /// Returns the server listening at `server`'s address.
    #[must_use]
    pub fn server(&self, server: &ServerConfig) -> Option<MemoryServer> {
        self.servers.lock().get(&server.address()).cloned()
    }
}

impl Connector for MemoryConnector {
    type Client = MemoryClient;

    async fn connect(&self, server: &ServerConfig) -> Result<MemoryClient, ProtocolError> {
        let address = server.address();
        let target = self.servers.lock().get(&address).cloned();
        let Some(target) = target else {
            return Err(ProtocolError::ConnectionFailed(format!(
                "connection refused by {address}"
            )));
        };

        let delay = target.inner.lock().connect_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = target.inner.lock();
        if !state.online {
            return Err(ProtocolError::ConnectionFailed(format!(
                "connection refused by {address}"
            )));
        }
        state.connections += 1;
        state.open_connections += 1;
        drop(state);

        Ok(MemoryClient { server: target })
    }
}

/// A connection to a [`MemoryServer`].
#[derive(Debug)]
pub struct MemoryClient {
    server: MemoryServer,
}

impl WireClient for MemoryClient {
    async fn controller_count(&mut self) -> Result<u32, ProtocolError> {
        let delay = self.server.inner.lock().reply_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let count = self.server.inner.lock().controllers.len();
        u32::try_from(count).map_err(|_| ProtocolError::MalformedPacket("too many controllers".into()))
    }

    async fn controller_data(&mut self, index: u32) -> Result<ControllerSnapshot, ProtocolError> {
        let state = self.server.inner.lock();
        let controller = usize::try_from(index)
            .ok()
            .and_then(|i| state.controllers.get(i))
            .ok_or(ProtocolError::UnknownController(index))?;
        Ok(ControllerSnapshot {
            device_id: index,
            ..controller.clone()
        })
    }

    async fn update_mode(&mut self, index: u32, mode_id: u32) -> Result<(), ProtocolError> {
        let mut state = self.server.inner.lock();
        if state.reject_mode_writes {
            return Err(ProtocolError::WriteRejected(format!(
                "mode write to controller {index}"
            )));
        }
        let controller = usize::try_from(index)
            .ok()
            .and_then(|i| state.controllers.get_mut(i))
            .ok_or(ProtocolError::UnknownController(index))?;
        if controller.mode(mode_id).is_none() {
            return Err(ProtocolError::UnknownMode {
                controller: index,
                mode: mode_id,
            });
        }
        controller.active_mode = Some(mode_id);
        state.writes.push(Write::Mode {
            controller: index,
            mode_id,
        });
        Ok(())
    }

    async fn update_leds(&mut self, index: u32, colors: &[RgbColor]) -> Result<(), ProtocolError> {
        let mut state = self.server.inner.lock();
        if state.reject_led_writes {
            return Err(ProtocolError::WriteRejected(format!(
                "LED write to controller {index}"
            )));
        }
        let controller = usize::try_from(index)
            .ok()
            .and_then(|i| state.controllers.get_mut(i))
            .ok_or(ProtocolError::UnknownController(index))?;
        controller.colors = colors.to_vec();
        state.writes.push(Write::Leds {
            controller: index,
            colors: colors.to_vec(),
        });
        Ok(())
    }

    async fn disconnect(self) -> Result<(), ProtocolError> {
        let mut state = self.server.inner.lock();
        state.open_connections = state.open_connections.saturating_sub(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerMode;

    fn server_config() -> ServerConfig {
        ServerConfig::new("PC", "127.0.0.1", 6742)
    }

    fn strip() -> ControllerSnapshot {
        ControllerSnapshot::new(0, "Strip")
            .with_modes(vec![ControllerMode::new(0, "Direct"), ControllerMode::new(1, "Off")])
            .with_uniform_color(3, RgbColor::white())
    }

    #[tokio::test]
    async fn unknown_address_is_refused() {
        let connector = MemoryConnector::new();
        let result = connector.connect(&server_config()).await;
        assert!(matches!(result, Err(ProtocolError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn offline_server_is_refused() {
        let connector = MemoryConnector::new();
        let server = connector.add_server(&server_config());
        server.set_online(false);

        assert!(connector.connect(&server_config()).await.is_err());
        assert_eq!(server.connection_count(), 0);
    }

    #[tokio::test]
    async fn reads_controllers_with_indices() {
        let connector = MemoryConnector::new();
        let server = connector.add_server(&server_config());
        server.add_controller(strip());
        server.add_controller(ControllerSnapshot::new(0, "Fan"));

        let mut client = connector.connect(&server_config()).await.unwrap();
        assert_eq!(client.controller_count().await.unwrap(), 2);
        let fan = client.controller_data(1).await.unwrap();
        assert_eq!(fan.name, "Fan");
        assert_eq!(fan.device_id, 1);
        assert!(matches!(
            client.controller_data(2).await,
            Err(ProtocolError::UnknownController(2))
        ));
    }

    #[tokio::test]
    async fn writes_are_applied_and_recorded() {
        let connector = MemoryConnector::new();
        let server = connector.add_server(&server_config());
        server.add_controller(strip());

        let mut client = connector.connect(&server_config()).await.unwrap();
        client.update_mode(0, 1).await.unwrap();
        client.update_leds(0, &[RgbColor::black(); 3]).await.unwrap();
        client.disconnect().await.unwrap();

        let controller = server.controller("Strip").unwrap();
        assert_eq!(controller.active_mode, Some(1));
        assert_eq!(controller.current_rgb_color(), RgbColor::black());
        assert_eq!(
            server.writes(),
            vec![
                Write::Mode {
                    controller: 0,
                    mode_id: 1
                },
                Write::Leds {
                    controller: 0,
                    colors: vec![RgbColor::black(); 3]
                },
            ]
        );
        assert_eq!(server.open_connections(), 0);
    }

    #[tokio::test]
    async fn undeclared_mode_is_rejected() {
        let connector = MemoryConnector::new();
        let server = connector.add_server(&server_config());
        server.add_controller(strip());

        let mut client = connector.connect(&server_config()).await.unwrap();
        let result = client.update_mode(0, 9).await;
        assert!(matches!(result, Err(ProtocolError::UnknownMode { .. })));
        assert!(server.writes().is_empty());
    }

    #[tokio::test]
    async fn rejected_writes_fail() {
        let connector = MemoryConnector::new();
        let server = connector.add_server(&server_config());
        server.add_controller(strip());
        server.reject_led_writes(true);

        let mut client = connector.connect(&server_config()).await.unwrap();
        assert!(client.update_leds(0, &[RgbColor::white()]).await.is_err());
        assert!(client.update_mode(0, 0).await.is_ok());
    }
}
