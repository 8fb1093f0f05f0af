// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OpenRGB SDK packet encoding, protocol version 0.
//!
//! Every packet starts with a 16-byte header: the `ORGB` magic followed by
//! the device index, the packet id and the payload size, all little-endian
//! `u32`s. Strings in payloads are a `u16` length (counting the trailing NUL)
//! followed by the bytes.

use crate::controller::{ControllerMode, ControllerSnapshot, ModeSettings};
use crate::error::ProtocolError;
use crate::types::RgbColor;

pub(crate) const MAGIC: &[u8; 4] = b"ORGB";
pub(crate) const HEADER_LEN: usize = 16;
/// Largest payload accepted from a server.
pub(crate) const MAX_PAYLOAD_LEN: u32 = 4 * 1024 * 1024;

pub(crate) const REQUEST_CONTROLLER_COUNT: u32 = 0;
pub(crate) const REQUEST_CONTROLLER_DATA: u32 = 1;
pub(crate) const SET_CLIENT_NAME: u32 = 50;
pub(crate) const UPDATE_LEDS: u32 = 1050;
pub(crate) const UPDATE_MODE: u32 = 1101;

/// Decoded packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    pub device: u32,
    pub id: u32,
    pub size: u32,
}

impl Header {
    pub fn decode(bytes: &[u8; HEADER_LEN]) -> Result<Self, ProtocolError> {
        if &bytes[..4] != MAGIC {
            return Err(ProtocolError::MalformedPacket(format!(
                "bad magic {:02x?}",
                &bytes[..4]
            )));
        }
        let mut reader = Reader::new(&bytes[4..]);
        let header = Self {
            device: reader.u32()?,
            id: reader.u32()?,
            size: reader.u32()?,
        };
        if header.size > MAX_PAYLOAD_LEN {
            return Err(ProtocolError::MalformedPacket(format!(
                "payload of {} bytes exceeds {MAX_PAYLOAD_LEN}",
                header.size
            )));
        }
        Ok(header)
    }
}

/// Builds a complete packet, header included.
pub(crate) fn encode(device: u32, id: u32, payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let size = u32::try_from(payload.len())
        .map_err(|_| ProtocolError::MalformedPacket("payload too large".into()))?;
    let mut packet = Vec::with_capacity(HEADER_LEN + payload.len());
    packet.extend_from_slice(MAGIC);
    packet.extend_from_slice(&device.to_le_bytes());
    packet.extend_from_slice(&id.to_le_bytes());
    packet.extend_from_slice(&size.to_le_bytes());
    packet.extend_from_slice(payload);
    Ok(packet)
}

/// Little-endian cursor over a payload.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ProtocolError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| {
                ProtocolError::MalformedPacket(format!(
                    "truncated payload: wanted {len} bytes at offset {}, have {}",
                    self.pos,
                    self.buf.len()
                ))
            })?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u16(&mut self) -> Result<u16, ProtocolError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> Result<u32, ProtocolError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn i32(&mut self) -> Result<i32, ProtocolError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    pub fn skip(&mut self, len: usize) -> Result<(), ProtocolError> {
        self.take(len).map(|_| ())
    }

    pub fn string(&mut self) -> Result<String, ProtocolError> {
        let len = usize::from(self.u16()?);
        let bytes = self.take(len)?;
        let bytes = bytes.strip_suffix(&[0]).unwrap_or(bytes);
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn color(&mut self) -> Result<RgbColor, ProtocolError> {
        Ok(RgbColor::from_wire(self.u32()?))
    }

    fn colors(&mut self) -> Result<Vec<RgbColor>, ProtocolError> {
        let count = self.u16()?;
        (0..count).map(|_| self.color()).collect()
    }
}

/// Little-endian payload builder.
#[derive(Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn string(&mut self, value: &str) -> Result<&mut Self, ProtocolError> {
        let len = u16::try_from(value.len() + 1)
            .map_err(|_| ProtocolError::MalformedPacket(format!("string too long: {value}")))?;
        self.u16(len);
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.push(0);
        Ok(self)
    }

    pub fn colors(&mut self, colors: &[RgbColor]) -> Result<&mut Self, ProtocolError> {
        let count = u16::try_from(colors.len())
            .map_err(|_| ProtocolError::MalformedPacket("too many colors".into()))?;
        self.u16(count);
        for color in colors {
            self.u32(color.to_wire());
        }
        Ok(self)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Decodes a `REQUEST_CONTROLLER_DATA` reply.
pub(crate) fn parse_controller(index: u32, payload: &[u8]) -> Result<ControllerSnapshot, ProtocolError> {
    let mut reader = Reader::new(payload);
    let _data_size = reader.u32()?;
    let device_type = reader.i32()?;
    let name = reader.string()?;
    let description = reader.string()?;
    let version = reader.string()?;
    let serial = reader.string()?;
    let location = reader.string()?;

    let num_modes = reader.u16()?;
    let active_mode = reader.i32()?;
    let modes = (0..num_modes)
        .map(|id| parse_mode(&mut reader, u32::from(id)))
        .collect::<Result<Vec<_>, _>>()?;

    let num_zones = reader.u16()?;
    for _ in 0..num_zones {
        reader.string()?;
        reader.i32()?;
        reader.u32()?;
        reader.u32()?;
        reader.u32()?;
        let matrix_len = reader.u16()?;
        reader.skip(usize::from(matrix_len))?;
    }

    let num_leds = reader.u16()?;
    for _ in 0..num_leds {
        reader.string()?;
        reader.u32()?;
    }

    let colors = reader.colors()?;

    let active_mode = u32::try_from(active_mode)
        .ok()
        .filter(|mode| *mode < u32::from(num_modes));

    Ok(ControllerSnapshot {
        device_id: index,
        device_type,
        name,
        description,
        version,
        serial,
        location,
        active_mode,
        colors,
        modes,
    })
}

fn parse_mode(reader: &mut Reader<'_>, id: u32) -> Result<ControllerMode, ProtocolError> {
    let name = reader.string()?;
    let settings = ModeSettings {
        value: reader.i32()?,
        flags: reader.u32()?,
        speed_min: reader.u32()?,
        speed_max: reader.u32()?,
        colors_min: reader.u32()?,
        colors_max: reader.u32()?,
        speed: reader.u32()?,
        direction: reader.u32()?,
        color_mode: reader.u32()?,
        colors: reader.colors()?,
    };
    Ok(ControllerMode { id, name, settings })
}

/// Builds an `UPDATE_MODE` payload.
pub(crate) fn mode_payload(mode: &ControllerMode) -> Result<Vec<u8>, ProtocolError> {
    let mode_idx = i32::try_from(mode.id)
        .map_err(|_| ProtocolError::MalformedPacket(format!("mode id {} out of range", mode.id)))?;
    let settings = &mode.settings;

    let mut body = Writer::new();
    body.i32(mode_idx);
    body.string(&mode.name)?;
    body.i32(settings.value)
        .u32(settings.flags)
        .u32(settings.speed_min)
        .u32(settings.speed_max)
        .u32(settings.colors_min)
        .u32(settings.colors_max)
        .u32(settings.speed)
        .u32(settings.direction)
        .u32(settings.color_mode);
    body.colors(&settings.colors)?;

    with_data_size(&body.into_bytes())
}

/// Builds an `UPDATE_LEDS` payload.
pub(crate) fn leds_payload(colors: &[RgbColor]) -> Result<Vec<u8>, ProtocolError> {
    let mut body = Writer::new();
    body.colors(colors)?;
    with_data_size(&body.into_bytes())
}

/// Builds a `SET_CLIENT_NAME` payload.
pub(crate) fn client_name_payload(name: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(name.len() + 1);
    payload.extend_from_slice(name.as_bytes());
    payload.push(0);
    payload
}

fn with_data_size(body: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let data_size = u32::try_from(body.len() + 4)
        .map_err(|_| ProtocolError::MalformedPacket("payload too large".into()))?;
    let mut writer = Writer::new();
    writer.u32(data_size);
    let mut payload = writer.into_bytes();
    payload.extend_from_slice(body);
    Ok(payload)
}
