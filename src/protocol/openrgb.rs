// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TCP client for the OpenRGB SDK protocol.
//!
//! Speaks protocol version 0, which every SDK server understands. Requests
//! are answered in order, but servers may interleave notifications such as
//! "device list updated"; those are skipped while waiting for a reply. Each
//! reply must arrive within the connector's reply timeout.
//!
//! # Examples
//!
//! ```no_run
//! use openrgb_bridge::manager::ServerConfig;
//! use openrgb_bridge::protocol::{Connector, OpenRgbConnector, WireClient};
//!
//! # async fn example() -> Result<(), openrgb_bridge::error::ProtocolError> {
//! let connector = OpenRgbConnector::new("OpenRGB");
//! let mut client = connector.connect(&ServerConfig::new("PC", "localhost", 6742)).await?;
//! let count = client.controller_count().await?;
//! println!("{count} controllers");
//! client.disconnect().await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::controller::ControllerSnapshot;
use crate::error::ProtocolError;
use crate::manager::{PlatformConfig, ServerConfig};
use crate::types::RgbColor;

use super::packet::{self, Header, Reader};
use super::{Connector, WireClient};

/// Opens SDK connections over TCP.
#[derive(Debug, Clone)]
pub struct OpenRgbConnector {
    client_name: String,
    reply_timeout: Duration,
}

impl OpenRgbConnector {
    /// Creates a connector that announces itself to servers as `client_name`.
    ///
    /// Replies are awaited for the default connection timeout.
    #[must_use]
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            reply_timeout: Duration::from_millis(PlatformConfig::DEFAULT_CONNECTION_TIMEOUT_MS),
        }
    }

    /// Sets how long a client waits for each reply.
    #[must_use]
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Returns the name announced to servers.
    #[must_use]
    pub fn client_name(&self) -> &str {
        &self.client_name
    }
}

impl Connector for OpenRgbConnector {
    type Client = OpenRgbClient;

    async fn connect(&self, server: &ServerConfig) -> Result<OpenRgbClient, ProtocolError> {
        let stream = TcpStream::connect((server.host.as_str(), server.port))
            .await
            .map_err(|e| ProtocolError::ConnectionFailed(format!("{}: {e}", server.address())))?;
        stream.set_nodelay(true)?;

        let mut client = OpenRgbClient {
            stream,
            reply_timeout: self.reply_timeout,
            controllers: HashMap::new(),
        };
        client
            .send(0, packet::SET_CLIENT_NAME, &packet::client_name_payload(&self.client_name))
            .await?;

        tracing::debug!(server = %server, "Connected to OpenRGB server");
        Ok(client)
    }
}

/// An SDK connection to one server.
#[derive(Debug)]
pub struct OpenRgbClient {
    stream: TcpStream,
    reply_timeout: Duration,
    /// Controllers read on this connection, needed to echo mode settings back.
    controllers: HashMap<u32, ControllerSnapshot>,
}

impl OpenRgbClient {
    async fn send(&mut self, device: u32, id: u32, payload: &[u8]) -> Result<(), ProtocolError> {
        let packet = packet::encode(device, id, payload)?;
        self.stream.write_all(&packet).await?;
        Ok(())
    }

    /// Reads packets until one with the given id arrives and returns its payload.
    ///
    /// Fails with `ProtocolError::Timeout` if the reply does not arrive
    /// within the reply timeout.
    async fn receive(&mut self, id: u32) -> Result<Vec<u8>, ProtocolError> {
        let timeout = self.reply_timeout;
        tokio::time::timeout(timeout, self.receive_packet(id))
            .await
            .map_err(|_| {
                ProtocolError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
            })?
    }

    async fn receive_packet(&mut self, id: u32) -> Result<Vec<u8>, ProtocolError> {
        loop {
            let mut header = [0u8; packet::HEADER_LEN];
            read_exact(&mut self.stream, &mut header).await?;
            let header = Header::decode(&header)?;

            let len = usize::try_from(header.size)
                .map_err(|_| ProtocolError::MalformedPacket("payload size overflow".into()))?;
            let mut payload = vec![0u8; len];
            read_exact(&mut self.stream, &mut payload).await?;

            if header.id == id {
                return Ok(payload);
            }
            tracing::trace!(packet_id = header.id, size = header.size, "Skipping unrelated packet");
        }
    }

    async fn snapshot(&mut self, index: u32) -> Result<ControllerSnapshot, ProtocolError> {
        if let Some(snapshot) = self.controllers.get(&index) {
            return Ok(snapshot.clone());
        }
        self.controller_data(index).await
    }
}

async fn read_exact(stream: &mut TcpStream, buf: &mut [u8]) -> Result<(), ProtocolError> {
    match stream.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(ProtocolError::Closed),
        Err(e) => Err(e.into()),
    }
}

impl WireClient for OpenRgbClient {
    async fn controller_count(&mut self) -> Result<u32, ProtocolError> {
        self.send(0, packet::REQUEST_CONTROLLER_COUNT, &[]).await?;
        let payload = self.receive(packet::REQUEST_CONTROLLER_COUNT).await?;
        Reader::new(&payload).u32()
    }

    async fn controller_data(&mut self, index: u32) -> Result<ControllerSnapshot, ProtocolError> {
        // An empty payload requests protocol version 0.
        self.send(index, packet::REQUEST_CONTROLLER_DATA, &[]).await?;
        let payload = self.receive(packet::REQUEST_CONTROLLER_DATA).await?;
        if payload.is_empty() {
            return Err(ProtocolError::UnknownController(index));
        }
        let snapshot = packet::parse_controller(index, &payload)?;
        self.controllers.insert(index, snapshot.clone());
        Ok(snapshot)
    }

    async fn update_mode(&mut self, index: u32, mode_id: u32) -> Result<(), ProtocolError> {
        let snapshot = self.snapshot(index).await?;
        let mode = snapshot.mode(mode_id).ok_or(ProtocolError::UnknownMode {
            controller: index,
            mode: mode_id,
        })?;
        let payload = packet::mode_payload(mode)?;
        self.send(index, packet::UPDATE_MODE, &payload).await?;

        if let Some(cached) = self.controllers.get_mut(&index) {
            cached.active_mode = Some(mode_id);
        }
        Ok(())
    }

    async fn update_leds(&mut self, index: u32, colors: &[RgbColor]) -> Result<(), ProtocolError> {
        let payload = packet::leds_payload(colors)?;
        self.send(index, packet::UPDATE_LEDS, &payload).await
    }

    async fn disconnect(mut self) -> Result<(), ProtocolError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
