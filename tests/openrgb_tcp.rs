// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the OpenRGB SDK TCP client against a loopback fake server.

#![cfg(feature = "tcp")]

use std::time::Duration;

use openrgb_bridge::error::ProtocolError;
use openrgb_bridge::manager::{Platform, PlatformConfig, ServerConfig};
use openrgb_bridge::protocol::{Connector, OpenRgbConnector, WireClient};
use openrgb_bridge::session::with_connection;
use openrgb_bridge::types::RgbColor;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const REQUEST_CONTROLLER_COUNT: u32 = 0;
const REQUEST_CONTROLLER_DATA: u32 = 1;
const SET_CLIENT_NAME: u32 = 50;
const DEVICE_LIST_UPDATED: u32 = 100;
const UPDATE_LEDS: u32 = 1050;
const UPDATE_MODE: u32 = 1101;

// ============================================================================
// Fake server
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct Packet {
    device: u32,
    id: u32,
    payload: Vec<u8>,
}

#[derive(Default)]
struct Payload(Vec<u8>);

impl Payload {
    fn u16(mut self, value: u16) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    fn u32(mut self, value: u32) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    fn i32(mut self, value: i32) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    fn string(self, value: &str) -> Self {
        let mut this = self.u16(u16::try_from(value.len() + 1).unwrap());
        this.0.extend_from_slice(value.as_bytes());
        this.0.push(0);
        this
    }

    fn color(self, r: u8, g: u8, b: u8) -> Self {
        self.u32(u32::from_le_bytes([r, g, b, 0]))
    }

    fn mode(self, name: &str, value: i32) -> Self {
        self.string(name)
            .i32(value)
            .u32(0x20)
            .u32(1)
            .u32(5)
            .u32(0)
            .u32(0)
            .u32(3)
            .u32(0)
            .u32(1)
            .u16(0)
    }
}

/// A controller with Direct and Off modes and three orange LEDs.
fn controller_payload(name: &str) -> Vec<u8> {
    let body = Payload::default()
        .i32(1)
        .string(name)
        .string("ASUS Aura Addressable")
        .string("1.0")
        .string("")
        .string("HID: /dev/hidraw0")
        .u16(2)
        .i32(0)
        .mode("Direct", 0)
        .mode("Off", 1)
        .u16(1)
        .string("Header 1")
        .i32(1)
        .u32(0)
        .u32(60)
        .u32(3)
        .u16(0)
        .u16(3)
        .string("LED 1")
        .u32(0)
        .string("LED 2")
        .u32(1)
        .string("LED 3")
        .u32(2)
        .u16(3)
        .color(255, 128, 0)
        .color(255, 128, 0)
        .color(255, 128, 0);
    let mut payload = u32::try_from(body.0.len() + 4).unwrap().to_le_bytes().to_vec();
    payload.extend_from_slice(&body.0);
    payload
}

async fn write_packet(stream: &mut TcpStream, device: u32, id: u32, payload: &[u8]) {
    let mut packet = b"ORGB".to_vec();
    packet.extend_from_slice(&device.to_le_bytes());
    packet.extend_from_slice(&id.to_le_bytes());
    packet.extend_from_slice(&u32::try_from(payload.len()).unwrap().to_le_bytes());
    packet.extend_from_slice(payload);
    stream.write_all(&packet).await.unwrap();
}

async fn read_packet(stream: &mut TcpStream) -> Option<Packet> {
    let mut header = [0u8; 16];
    stream.read_exact(&mut header).await.ok()?;
    assert_eq!(&header[..4], b"ORGB");
    let device = u32::from_le_bytes(header[4..8].try_into().unwrap());
    let id = u32::from_le_bytes(header[8..12].try_into().unwrap());
    let size = u32::from_le_bytes(header[12..16].try_into().unwrap());
    let mut payload = vec![0u8; size as usize];
    stream.read_exact(&mut payload).await.ok()?;
    Some(Packet {
        device,
        id,
        payload,
    })
}

/// Serves one connection with `controllers` and returns every packet received.
async fn spawn_server(controllers: Vec<&'static str>) -> (ServerConfig, JoinHandle<Vec<Packet>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        while let Some(packet) = read_packet(&mut stream).await {
            match packet.id {
                REQUEST_CONTROLLER_COUNT => {
                    write_packet(&mut stream, 0, DEVICE_LIST_UPDATED, &[]).await;
                    let count = u32::try_from(controllers.len()).unwrap();
                    write_packet(&mut stream, 0, REQUEST_CONTROLLER_COUNT, &count.to_le_bytes())
                        .await;
                }
                REQUEST_CONTROLLER_DATA => {
                    let payload = controllers
                        .get(packet.device as usize)
                        .map(|name| controller_payload(name))
                        .unwrap_or_default();
                    write_packet(&mut stream, packet.device, REQUEST_CONTROLLER_DATA, &payload)
                        .await;
                }
                _ => {}
            }
            received.push(packet);
        }
        received
    });

    (ServerConfig::new("Loopback", "127.0.0.1", port), handle)
}

/// Accepts one connection, reads whatever the client sends and never answers.
async fn spawn_silent_server() -> ServerConfig {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut sink = Vec::new();
        let _ = stream.read_to_end(&mut sink).await;
    });

    ServerConfig::new("Silent", "127.0.0.1", port)
}

// ============================================================================
// Client
// ============================================================================

mod client {
    use super::*;

    #[tokio::test]
    async fn announces_name_and_reads_controllers() {
        let (server, handle) = spawn_server(vec!["Aura Header", "Aura Fan"]).await;
        let connector = OpenRgbConnector::new("Bridge");

        let mut client = connector.connect(&server).await.unwrap();
        assert_eq!(client.controller_count().await.unwrap(), 2);
        let fan = client.controller_data(1).await.unwrap();
        client.disconnect().await.unwrap();

        assert_eq!(fan.device_id, 1);
        assert_eq!(fan.name, "Aura Fan");
        assert_eq!(fan.description, "ASUS Aura Addressable");
        assert_eq!(fan.location, "HID: /dev/hidraw0");
        assert_eq!(fan.active_mode, Some(0));
        assert_eq!(fan.direct_mode_id(), Some(0));
        assert_eq!(fan.off_mode_id(), Some(1));
        assert_eq!(fan.colors, vec![RgbColor::new(255, 128, 0); 3]);

        let received = handle.await.unwrap();
        assert_eq!(
            received[0],
            Packet {
                device: 0,
                id: SET_CLIENT_NAME,
                payload: b"Bridge\0".to_vec()
            }
        );
        assert_eq!(received[2].id, REQUEST_CONTROLLER_DATA);
        assert!(received[2].payload.is_empty());
    }

    #[tokio::test]
    async fn writes_mode_and_leds() {
        let (server, handle) = spawn_server(vec!["Aura Header"]).await;
        let connector = OpenRgbConnector::new("Bridge");

        let mut client = connector.connect(&server).await.unwrap();
        client.controller_data(0).await.unwrap();
        client.update_mode(0, 1).await.unwrap();
        client.update_leds(0, &[RgbColor::new(1, 2, 3); 3]).await.unwrap();
        client.disconnect().await.unwrap();

        let received = handle.await.unwrap();
        let mode = received.iter().find(|p| p.id == UPDATE_MODE).unwrap();
        assert_eq!(mode.device, 0);
        let data_size = u32::from_le_bytes(mode.payload[0..4].try_into().unwrap());
        assert_eq!(data_size as usize, mode.payload.len());
        assert_eq!(i32::from_le_bytes(mode.payload[4..8].try_into().unwrap()), 1);
        assert_eq!(&mode.payload[8..14], b"\x04\x00Off\0");

        let leds = received.iter().find(|p| p.id == UPDATE_LEDS).unwrap();
        let mut expected = 18u32.to_le_bytes().to_vec();
        expected.extend_from_slice(&3u16.to_le_bytes());
        for _ in 0..3 {
            expected.extend_from_slice(&[1, 2, 3, 0]);
        }
        assert_eq!(leds.payload, expected);
    }

    #[tokio::test]
    async fn unknown_mode_is_not_sent() {
        let (server, handle) = spawn_server(vec!["Aura Header"]).await;
        let connector = OpenRgbConnector::new("Bridge");

        let mut client = connector.connect(&server).await.unwrap();
        client.controller_data(0).await.unwrap();
        let result = client.update_mode(0, 7).await;
        client.disconnect().await.unwrap();

        assert!(matches!(result, Err(ProtocolError::UnknownMode { mode: 7, .. })));
        assert!(!handle.await.unwrap().iter().any(|p| p.id == UPDATE_MODE));
    }

    #[tokio::test]
    async fn silent_server_reply_times_out() {
        let server = spawn_silent_server().await;
        let connector = OpenRgbConnector::new("Bridge").with_reply_timeout(Duration::from_millis(300));

        let mut client = connector.connect(&server).await.unwrap();
        let result = client.controller_count().await;

        assert!(matches!(result, Err(ProtocolError::Timeout(300))));
    }

    #[tokio::test]
    async fn refused_connection_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = OpenRgbConnector::new("Bridge")
            .connect(&ServerConfig::new("Gone", "127.0.0.1", port))
            .await;

        assert!(matches!(result, Err(ProtocolError::ConnectionFailed(_))));
    }
}

// ============================================================================
// End to end
// ============================================================================

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn session_enumerates_over_tcp() {
        let (server, handle) = spawn_server(vec!["Aura Header", "Aura Fan"]).await;
        let connector = OpenRgbConnector::new("Bridge");

        let names = with_connection(&connector, &server, Duration::from_secs(3), |_, snapshots| {
            Box::pin(async move { snapshots.into_iter().map(|s| s.name).collect::<Vec<_>>() })
        })
        .await
        .unwrap();

        assert_eq!(names, vec!["Aura Header", "Aura Fan"]);
        let received = handle.await.unwrap();
        assert_eq!(received.len(), 4);
    }

    #[tokio::test]
    async fn platform_discovers_over_tcp() {
        let (server, _handle) = spawn_server(vec!["Aura Header"]).await;
        let config = PlatformConfig::new(vec![server]).with_discovery_interval(0);
        let platform = Platform::new(config, OpenRgbConnector::new("Bridge"));

        let report = platform.discover_devices().await.unwrap();

        assert_eq!(report.registered, 1);
        let record = platform.records().await.pop().unwrap();
        assert_eq!(record.display_name, "Aura Header");
        assert_eq!(record.context.device.serial, "");
    }

    #[tokio::test]
    async fn silent_server_does_not_stall_discovery() {
        let silent = spawn_silent_server().await;
        let (server, _handle) = spawn_server(vec!["Aura Header"]).await;
        let config = PlatformConfig::new(vec![silent, server])
            .with_connection_timeout(Duration::from_millis(500))
            .with_discovery_interval(0);
        let platform = Platform::new(config, OpenRgbConnector::new("Bridge"));

        let report = tokio::time::timeout(Duration::from_secs(5), platform.discover_devices())
            .await
            .expect("discovery finishes")
            .unwrap();

        assert_eq!(report.unreachable_servers, 1);
        assert_eq!(report.registered, 1);
    }
}
