// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discovery and registration of light accessories.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

use crate::accessory::{AccessoryRecord, LightAccessory, display_name};
use crate::controller::ControllerSnapshot;
use crate::error::Error;
use crate::event::{AccessoryEvent, AccessoryId, EventBus};
use crate::protocol::Connector;
use crate::session::with_connection;

use super::managed_accessory::ManagedAccessory;
use super::{PlatformConfig, ServerConfig};

/// Outcome of one discovery cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Controllers reported by reachable servers, duplicates included.
    pub discovered: usize,
    /// Accessories created this cycle.
    pub registered: usize,
    /// Existing accessories refreshed this cycle.
    pub updated: usize,
    /// Accessories removed this cycle.
    pub removed: usize,
    /// Configured servers that could not be read.
    pub unreachable_servers: usize,
}

/// The bridge platform.
///
/// Keeps one accessory per controller identity. Each discovery cycle reads
/// every configured server, registers controllers seen for the first time,
/// refreshes known ones and removes those that are gone. Hosts follow along
/// through [`subscribe`](Self::subscribe) and bind their characteristics to
/// the handlers returned by [`accessory`](Self::accessory).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use openrgb_bridge::controller::ControllerSnapshot;
/// use openrgb_bridge::event::AccessoryEvent;
/// use openrgb_bridge::manager::{Platform, PlatformConfig, ServerConfig};
/// use openrgb_bridge::protocol::MemoryConnector;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> openrgb_bridge::Result<()> {
/// let server = ServerConfig::new("PC", "127.0.0.1", 6742);
/// let connector = MemoryConnector::new();
/// connector.add_server(&server).add_controller(ControllerSnapshot::new(0, "Desk Strip"));
///
/// let platform = Platform::new(PlatformConfig::new(vec![server]), connector);
/// let mut events = platform.subscribe();
///
/// let report = platform.discover_devices().await?;
/// assert_eq!(report.registered, 1);
/// assert!(matches!(events.try_recv(), Ok(AccessoryEvent::Registered { .. })));
/// # Ok(())
/// # }
/// ```
pub struct Platform<C: Connector> {
    config: parking_lot::RwLock<PlatformConfig>,
    connector: Arc<C>,
    /// Registered accessories, keyed by identity.
    accessories: Arc<RwLock<HashMap<AccessoryId, ManagedAccessory<C>>>>,
    /// Event bus for broadcasting accessory lifecycle events.
    event_bus: EventBus,
    /// Set once periodic discovery was started.
    started: AtomicBool,
}

impl<C: Connector> Platform<C> {
    /// Creates a platform. Nothing is discovered until
    /// [`discover_devices`](Self::discover_devices) or [`start`](Self::start)
    /// is called.
    #[must_use]
    pub fn new(config: PlatformConfig, connector: C) -> Self {
        tracing::debug!(platform = %config.name, servers = config.servers.len(), "Finished initializing platform");
        Self {
            config: parking_lot::RwLock::new(config),
            connector: Arc::new(connector),
            accessories: Arc::new(RwLock::new(HashMap::new())),
            event_bus: EventBus::new(),
            started: AtomicBool::new(false),
        }
    }

    /// Returns a copy of the current configuration.
    #[must_use]
    pub fn config(&self) -> PlatformConfig {
        self.config.read().clone()
    }

    /// Replaces the configuration; the next discovery cycle uses it.
    ///
    /// Handlers already attached keep their timeouts.
    pub fn update_config(&self, config: PlatformConfig) {
        *self.config.write() = config;
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to accessory lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AccessoryEvent> {
        self.event_bus.subscribe()
    }

    /// Returns the number of active event subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.event_bus.subscriber_count()
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// Restores an accessory persisted by the host.
    ///
    /// Must be called before the first discovery cycle. The accessory gets a
    /// handler once discovery sees its controller again. Returns `false` if
    /// an accessory with the same identity is already registered.
    pub async fn configure_accessory(&self, record: AccessoryRecord) -> bool {
        let mut accessories = self.accessories.write().await;
        if accessories.contains_key(&record.id) {
            tracing::warn!(accessory = %record.display_name, id = %record.id, "Accessory already registered, ignoring cached copy");
            return false;
        }
        tracing::info!(accessory = %record.display_name, "Loading accessory from cache");
        accessories.insert(record.id, ManagedAccessory::from_record(record));
        true
    }

    /// Returns the handler of an accessory.
    ///
    /// Restored accessories have no handler until discovery sees them.
    pub async fn accessory(&self, id: AccessoryId) -> Option<Arc<LightAccessory<C>>> {
        self.accessories
            .read()
            .await
            .get(&id)
            .and_then(|accessory| accessory.handler.clone())
    }

    /// Returns the persisted form of every registered accessory.
    pub async fn records(&self) -> Vec<AccessoryRecord> {
        self.accessories
            .read()
            .await
            .values()
            .map(ManagedAccessory::record)
            .collect()
    }

    /// Returns the identities of all registered accessories.
    pub async fn accessory_ids(&self) -> Vec<AccessoryId> {
        self.accessories.read().await.keys().copied().collect()
    }

    /// Returns the number of registered accessories.
    pub async fn accessory_count(&self) -> usize {
        self.accessories.read().await.len()
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    /// Runs one discovery cycle.
    ///
    /// Servers that cannot be reached contribute nothing and their
    /// accessories are left alone. Accessories are removed when their server
    /// left the configuration, or when their server answered without
    /// reporting them and `preserve_disconnected` is off.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid. Nothing is
    /// discovered in that case.
    pub async fn discover_devices(&self) -> Result<DiscoveryReport, Error> {
        let config = self.config();
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Invalid platform configuration, discovery stopped");
            return Err(e.into());
        }

        let mut report = DiscoveryReport::default();
        let mut found: Vec<(ControllerSnapshot, ServerConfig)> = Vec::new();
        let mut connected: HashSet<ServerConfig> = HashSet::new();

        for server in &config.servers {
            tracing::debug!(server = %server, "Discovering devices on server");
            let result = with_connection(
                self.connector.as_ref(),
                server,
                config.connection_timeout(),
                |_, snapshots| Box::pin(async move { snapshots }),
            )
            .await;

            match result {
                Ok(snapshots) => {
                    for snapshot in snapshots {
                        tracing::debug!(server = %server, device = %snapshot.name, "Discovered device");
                        found.push((snapshot, server.clone()));
                    }
                    connected.insert(server.clone());
                }
                Err(_) => report.unreachable_servers += 1,
            }
        }
        report.discovered = found.len();

        let events = self.reconcile(&config, found, &connected, &mut report).await;
        for event in events {
            self.event_bus.publish(event);
        }

        tracing::info!(
            discovered = report.discovered,
            registered = report.registered,
            updated = report.updated,
            removed = report.removed,
            unreachable_servers = report.unreachable_servers,
            "Discovery finished"
        );
        Ok(report)
    }

    /// Applies the controllers found this cycle to the registry.
    ///
    /// Returns the events to publish once the registry lock is released.
    async fn reconcile(
        &self,
        config: &PlatformConfig,
        found: Vec<(ControllerSnapshot, ServerConfig)>,
        connected: &HashSet<ServerConfig>,
        report: &mut DiscoveryReport,
    ) -> Vec<AccessoryEvent> {
        let mut events = Vec::new();
        let mut seen: HashMap<AccessoryId, ServerConfig> = HashMap::new();
        let mut accessories = self.accessories.write().await;

        for (device, server) in found {
            let id = device.identity();
            if let Some(first) = seen.get(&id) {
                tracing::warn!(
                    device = %device.name,
                    %id,
                    first_server = %first,
                    server = %server,
                    "Duplicate controller identity, keeping the first one"
                );
                continue;
            }
            seen.insert(id, server.clone());

            if let Some(accessory) = accessories.get_mut(&id) {
                accessory.context.write().refresh(device, server);
                if accessory.attach_handler(&self.connector, config) {
                    tracing::info!(accessory = %accessory.display_name, "Restoring existing accessory from cache");
                }
                report.updated += 1;
                events.push(AccessoryEvent::updated(id));
            } else {
                tracing::info!(device = %display_name(&device), "Adding new accessory");
                let mut record = AccessoryRecord::new(device.clone(), server.clone());
                record.context.refresh(device, server);
                let mut accessory = ManagedAccessory::from_record(record);
                accessory.attach_handler(&self.connector, config);
                events.push(AccessoryEvent::registered(id, accessory.display_name.clone()));
                accessories.insert(id, accessory);
                report.registered += 1;
            }
        }

        accessories.retain(|id, accessory| {
            let server = accessory.context.read().server.clone();
            let server_in_config = config.contains_server(&server);
            let server_connected = connected.contains(&server);
            let missing = server_connected && !seen.contains_key(id);

            if server_in_config && !(missing && !config.preserve_disconnected) {
                return true;
            }
            tracing::info!(accessory = %accessory.display_name, server = %server, "Removing accessory from cache");
            events.push(AccessoryEvent::unregistered(*id, accessory.display_name.clone()));
            report.removed += 1;
            false
        });

        events
    }
}

impl<C: Connector> Platform<C> {
    /// Starts periodic discovery.
    ///
    /// The first cycle runs immediately, the next ones every
    /// `discovery_interval` seconds. The loop ends after a single cycle when
    /// the interval is zero, and as soon as a cycle finds the configuration
    /// invalid. Abort the returned handle to stop it earlier.
    ///
    /// A platform runs at most one discovery loop: only the first call
    /// starts it, later calls return `None`.
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.started.swap(true, Ordering::AcqRel) {
            tracing::warn!("Periodic discovery already started, ignoring");
            return None;
        }
        let platform = Arc::clone(self);
        Some(tokio::spawn(async move {
            loop {
                if platform.discover_devices().await.is_err() {
                    return;
                }
                let Some(interval) = platform.config().discovery_interval() else {
                    tracing::debug!("Discovery interval is zero, not scheduling another cycle");
                    return;
                };
                tokio::time::sleep(interval).await;
            }
        }))
    }
}

impl<C: Connector> std::fmt::Debug for Platform<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("config", &*self.config.read())
            .finish_non_exhaustive()
    }
}
