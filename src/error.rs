// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! Device and network failures are reduced to [`ProtocolError`] values and
//! logged by the component that hit them. Configuration problems surface as
//! [`ConfigError`]. The top-level [`Error`] ties both together for callers
//! that want a single type.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while talking to an OpenRGB SDK server.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The platform configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to the controller-server wire protocol.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Connection to the server failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connecting took longer than the configured timeout.
    #[error("connection timed out after {0} ms")]
    Timeout(u64),

    /// Socket level failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server sent a packet that could not be decoded.
    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    /// The requested controller index is not known to the server.
    #[error("unknown controller {0}")]
    UnknownController(u32),

    /// The requested mode is not declared by the controller.
    #[error("controller {controller} has no mode {mode}")]
    UnknownMode {
        /// Controller index on the server.
        controller: u32,
        /// Requested mode id.
        mode: u32,
    },

    /// The server rejected a write.
    #[error("write rejected: {0}")]
    WriteRejected(String),

    /// The connection was closed by the peer.
    #[error("connection closed")]
    Closed,
}

/// Errors related to the platform configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A server entry is incomplete or malformed.
    #[error("invalid server entry #{index}: {reason}")]
    InvalidServer {
        /// Position of the entry in the `servers` list.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// A top-level field has an unusable value.
    #[error("invalid value for {field}: {reason}")]
    InvalidField {
        /// The offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
