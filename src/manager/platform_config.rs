// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Platform configuration.
//!
//! The configuration is a JSON document with camelCase keys:
//!
//! ```json
//! {
//!   "name": "OpenRGB",
//!   "servers": [
//!     { "name": "Desktop", "host": "192.168.1.20", "port": 6742 }
//!   ],
//!   "discoveryInterval": 60,
//!   "preserveDisconnected": false
//! }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// An OpenRGB SDK server endpoint.
///
/// Two entries are the same server only if name, host, and port all match.
/// Changing the host or port of an entry therefore makes it a new server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Display name, used in logs.
    pub name: String,
    /// Hostname or IP address.
    pub host: String,
    /// SDK server port.
    pub port: u16,
}

impl ServerConfig {
    /// Default OpenRGB SDK server port.
    pub const DEFAULT_PORT: u16 = 6742;

    /// Creates a server entry.
    #[must_use]
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
        }
    }

    /// Returns `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidServer {
            index,
            reason: reason.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.host.trim().is_empty() {
            return Err(invalid("host is empty"));
        }
        if self.port == 0 {
            return Err(invalid("port must be between 1 and 65535"));
        }
        Ok(())
    }
}

impl fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.host, self.port)
    }
}

/// Configuration of the bridge platform.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use openrgb_bridge::manager::{PlatformConfig, ServerConfig};
///
/// let config = PlatformConfig::from_json(r#"{
///     "servers": [{ "name": "Desktop", "host": "10.0.0.5", "port": 6742 }],
///     "discoveryInterval": 0
/// }"#).unwrap();
///
/// assert_eq!(config.servers, vec![ServerConfig::new("Desktop", "10.0.0.5", 6742)]);
/// assert!(config.discovery_interval().is_none());
/// assert_eq!(config.connection_timeout(), Duration::from_millis(3000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    /// Platform name, announced to servers as the SDK client name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Servers to discover controllers on.
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
    /// Seconds between discovery cycles; 0 runs a single cycle.
    #[serde(default = "default_discovery_interval")]
    pub discovery_interval: u64,
    /// Keep accessories that a reachable server stopped reporting.
    #[serde(default)]
    pub preserve_disconnected: bool,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
    /// Debounce delay before characteristic writes reach the device, in milliseconds.
    #[serde(default = "default_update_delay")]
    pub update_delay: u64,
}

fn default_name() -> String {
    PlatformConfig::DEFAULT_NAME.to_string()
}

fn default_discovery_interval() -> u64 {
    PlatformConfig::DEFAULT_DISCOVERY_INTERVAL_SECS
}

fn default_connection_timeout() -> u64 {
    PlatformConfig::DEFAULT_CONNECTION_TIMEOUT_MS
}

fn default_update_delay() -> u64 {
    PlatformConfig::DEFAULT_UPDATE_DELAY_MS
}

impl PlatformConfig {
    /// Default platform name.
    pub const DEFAULT_NAME: &'static str = "OpenRGB";
    /// Default seconds between discovery cycles.
    pub const DEFAULT_DISCOVERY_INTERVAL_SECS: u64 = 60;
    /// Default connect timeout in milliseconds.
    pub const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 3000;
    /// Default characteristic write debounce in milliseconds.
    pub const DEFAULT_UPDATE_DELAY_MS: u64 = 100;

    /// Creates a configuration with default settings for the given servers.
    #[must_use]
    pub fn new(servers: Vec<ServerConfig>) -> Self {
        Self {
            name: default_name(),
            servers,
            discovery_interval: Self::DEFAULT_DISCOVERY_INTERVAL_SECS,
            preserve_disconnected: false,
            connection_timeout: Self::DEFAULT_CONNECTION_TIMEOUT_MS,
            update_delay: Self::DEFAULT_UPDATE_DELAY_MS,
        }
    }

    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the document is not valid JSON or a
    /// field has the wrong type (e.g. a non-integer port or interval).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, or
    /// `ConfigError::Parse` if it cannot be parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Sets the discovery interval in seconds (0 disables recurrence).
    #[must_use]
    pub fn with_discovery_interval(mut self, seconds: u64) -> Self {
        self.discovery_interval = seconds;
        self
    }

    /// Keeps accessories that reachable servers stop reporting.
    #[must_use]
    pub fn with_preserve_disconnected(mut self, preserve: bool) -> Self {
        self.preserve_disconnected = preserve;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the characteristic write debounce delay.
    #[must_use]
    pub fn with_update_delay(mut self, delay: Duration) -> Self {
        self.update_delay = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Returns the delay between discovery cycles, or `None` for a single cycle.
    #[must_use]
    pub fn discovery_interval(&self) -> Option<Duration> {
        (self.discovery_interval != 0).then(|| Duration::from_secs(self.discovery_interval))
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout)
    }

    /// Returns the characteristic write debounce delay.
    #[must_use]
    pub fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay)
    }

    /// Returns `true` if `server` is one of the configured servers.
    #[must_use]
    pub fn contains_server(&self, server: &ServerConfig) -> bool {
        self.servers.contains(server)
    }

    /// Checks the configuration for entries that cannot be used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidServer` for an incomplete or duplicated
    /// server entry and `ConfigError::InvalidField` for a zero connection
    /// timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (index, server) in self.servers.iter().enumerate() {
            server.validate(index)?;
            if !seen.insert(server) {
                return Err(ConfigError::InvalidServer {
                    index,
                    reason: format!("duplicate of server {server}"),
                });
            }
        }
        if self.connection_timeout == 0 {
            return Err(ConfigError::InvalidField {
                field: "connectionTimeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
