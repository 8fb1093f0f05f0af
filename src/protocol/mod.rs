// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire clients for OpenRGB SDK servers.
//!
//! The bridge talks to servers only through two traits:
//!
//! - [`Connector`] opens a connection to a configured server
//! - [`WireClient`] performs the controller queries and writes on it
//!
//! # Implementations
//!
//! - [`OpenRgbConnector`]: TCP client for the OpenRGB SDK protocol (feature `tcp`)
//! - [`MemoryConnector`]: in-process servers, for embedding and tests

use std::future::Future;

use crate::controller::ControllerSnapshot;
use crate::error::ProtocolError;
use crate::manager::ServerConfig;
use crate::types::RgbColor;

pub mod memory;
#[cfg(feature = "tcp")]
mod openrgb;
#[cfg(feature = "tcp")]
mod packet;

pub use memory::{MemoryConnector, MemoryServer, Write};
#[cfg(feature = "tcp")]
pub use openrgb::{OpenRgbClient, OpenRgbConnector};

/// An open connection to one OpenRGB SDK server.
///
/// Controller indices are only meaningful for the connection they were
/// obtained on.
pub trait WireClient: Send {
    /// Returns the number of controllers on the server.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn controller_count(&mut self) -> impl Future<Output = Result<u32, ProtocolError>> + Send;

    /// Reads the full state of the controller at `index`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails or the index is unknown.
    fn controller_data(
        &mut self,
        index: u32,
    ) -> impl Future<Output = Result<ControllerSnapshot, ProtocolError>> + Send;

    /// Activates the mode `mode_id` on the controller at `index`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the mode is unknown or the write fails.
    fn update_mode(
        &mut self,
        index: u32,
        mode_id: u32,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Sets the LED colors of the controller at `index`, one color per LED.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the write fails.
    fn update_leds(
        &mut self,
        index: u32,
        colors: &[RgbColor],
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the connection could not be shut down cleanly.
    fn disconnect(self) -> impl Future<Output = Result<(), ProtocolError>> + Send
    where
        Self: Sized;
}

/// Opens [`WireClient`] connections to configured servers.
pub trait Connector: Send + Sync + 'static {
    /// The client type produced by this connector.
    type Client: WireClient;

    /// Connects to `server`.
    ///
    /// Timeouts are applied by the caller; dropping the returned future
    /// abandons the attempt and releases its resources.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the server cannot be reached.
    fn connect(
        &self,
        server: &ServerConfig,
    ) -> impl Future<Output = Result<Self::Client, ProtocolError>> + Send;
}
