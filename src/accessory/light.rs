// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light accessory handler.
//!
//! A [`LightAccessory`] backs the On, Hue, Saturation and Brightness
//! characteristics of one controller. Every get and set opens its own
//! connection session to the controller's server; nothing is polled in the
//! background.
//!
//! Gets never fail. A controller that is no longer reported answers with the
//! cached state, and an unreachable server makes the light read as off.
//!
//! Sets update the cached state right away and write to the device after a
//! short delay. Sets arriving within that delay are merged into a single
//! device write.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::controller::{ControllerSnapshot, resolve};
use crate::error::ProtocolError;
use crate::event::AccessoryId;
use crate::manager::PlatformConfig;
use crate::protocol::{Connector, WireClient};
use crate::session::{BoxFuture, with_connection};
use crate::state::{AccessoryState, StateChange};
use crate::types::HsvColor;

use super::context::{AccessoryContext, AccessoryInformation, SharedContext};
use super::update_plan::{UpdatePlan, UpdateRequest, plan_update};

/// Sets waiting for the debounce delay to pass.
#[derive(Debug, Default)]
struct PendingUpdate {
    generation: u64,
    toggling_power: bool,
    color_changed: bool,
}

/// Handler for one light accessory.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use openrgb_bridge::accessory::{AccessoryRecord, LightAccessory};
/// use openrgb_bridge::controller::{ControllerMode, ControllerSnapshot};
/// use openrgb_bridge::manager::ServerConfig;
/// use openrgb_bridge::protocol::MemoryConnector;
/// use openrgb_bridge::types::RgbColor;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let server = ServerConfig::new("PC", "127.0.0.1", 6742);
/// let device = ControllerSnapshot::new(0, "Desk Strip")
///     .with_modes(vec![ControllerMode::new(0, "Direct"), ControllerMode::new(1, "Off")])
///     .with_uniform_color(8, RgbColor::new(255, 0, 0));
///
/// let connector = Arc::new(MemoryConnector::new());
/// connector.add_server(&server).add_controller(device.clone());
///
/// let record = AccessoryRecord::new(device, server);
/// let light = LightAccessory::from_record(record, connector);
///
/// assert!(light.get_on().await);
/// assert_eq!(light.get_hue().await, 0);
/// # }
/// ```
pub struct LightAccessory<C: Connector> {
    id: AccessoryId,
    display_name: String,
    context: SharedContext,
    connector: Arc<C>,
    state: Mutex<AccessoryState>,
    pending: Mutex<PendingUpdate>,
    connection_timeout: Duration,
    update_delay: Duration,
}

impl<C: Connector> LightAccessory<C> {
    /// Creates a handler sharing `context` with its owner.
    #[must_use]
    pub fn new(
        id: AccessoryId,
        display_name: impl Into<String>,
        context: SharedContext,
        connector: Arc<C>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            context,
            connector,
            state: Mutex::new(AccessoryState::new()),
            pending: Mutex::new(PendingUpdate::default()),
            connection_timeout: Duration::from_millis(PlatformConfig::DEFAULT_CONNECTION_TIMEOUT_MS),
            update_delay: Duration::from_millis(PlatformConfig::DEFAULT_UPDATE_DELAY_MS),
        }
    }

    /// Creates a handler owning the context of `record`.
    #[must_use]
    pub fn from_record(record: super::AccessoryRecord, connector: Arc<C>) -> Self {
        let context = Arc::new(parking_lot::RwLock::new(record.context));
        Self::new(record.id, record.display_name, context, connector)
    }

    /// Sets how long connecting to the server may take.
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets how long sets wait before writing to the device.
    #[must_use]
    pub fn with_update_delay(mut self, delay: Duration) -> Self {
        self.update_delay = delay;
        self
    }

    /// Returns the accessory identity.
    #[must_use]
    pub fn id(&self) -> AccessoryId {
        self.id
    }

    /// Returns the name the accessory is shown under.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the cached state without contacting the device.
    #[must_use]
    pub fn state(&self) -> AccessoryState {
        *self.state.lock()
    }

    /// Returns a copy of the accessory context.
    #[must_use]
    pub fn context(&self) -> AccessoryContext {
        self.context.read().clone()
    }

    /// Returns the static accessory information.
    #[must_use]
    pub fn information(&self) -> AccessoryInformation {
        AccessoryInformation::from_snapshot(&self.context.read().device)
    }

    // ===== Characteristic getters =====

    /// Reads whether the light is on.
    ///
    /// Returns the cached value if the controller is no longer reported, and
    /// `false` without touching the cache if the server is unreachable.
    pub async fn get_on(&self) -> bool {
        let id = self.id;
        let result = self
            .session(move |_, snapshots| {
                Box::pin(async move { resolve(&snapshots, id).map(ControllerSnapshot::is_powered_on) })
            })
            .await;

        let on = match result {
            Ok(Some(on)) => {
                self.state.lock().apply(&StateChange::On(on));
                on
            }
            Ok(None) => self.state.lock().is_on(),
            Err(_) => false,
        };
        tracing::debug!(accessory = %self.display_name, on, "Get Characteristic On");
        on
    }

    /// Reads the hue (0-359).
    pub async fn get_hue(&self) -> u16 {
        let hue = self.read_color().await.hue();
        tracing::debug!(accessory = %self.display_name, hue, "Get Characteristic Hue");
        hue
    }

    /// Reads the saturation (0-100).
    pub async fn get_saturation(&self) -> u8 {
        let saturation = self.read_color().await.saturation();
        tracing::debug!(accessory = %self.display_name, saturation, "Get Characteristic Saturation");
        saturation
    }

    /// Reads the brightness (0-100).
    pub async fn get_brightness(&self) -> u8 {
        let brightness = self.read_color().await.brightness();
        tracing::debug!(accessory = %self.display_name, brightness, "Get Characteristic Brightness");
        brightness
    }

    /// Reads the device color.
    ///
    /// While the device is off its LEDs are black, so the cached color is
    /// returned instead. While it is on, its color and mode become the
    /// last-powered values.
    async fn read_color(&self) -> HsvColor {
        let id = self.id;
        let result = self
            .session(move |_, snapshots| {
                Box::pin(async move { resolve(&snapshots, id).cloned() })
            })
            .await;

        let Ok(Some(device)) = result else {
            return self.state.lock().hsv();
        };
        if !device.is_powered_on() {
            return self.state.lock().hsv();
        }

        let rgb = device.current_rgb_color();
        {
            let mut context = self.context.write();
            context.last_powered_rgb_color = Some(rgb);
            if let Some(mode) = device.active_mode.filter(|m| Some(*m) != device.off_mode_id()) {
                context.last_powered_mode_id = Some(mode);
            }
        }

        let hsv = rgb.to_hsv();
        self.state.lock().apply(&StateChange::Color(hsv));
        hsv
    }

    // ===== Characteristic setters =====

    /// Switches the light on or off.
    ///
    /// Switching off always writes the "Off" mode (when declared) and black.
    /// Switching on restores the last-powered mode and color.
    pub async fn set_on(&self, on: bool) {
        let change = StateChange::On(on);
        let edge = self.state.lock().apply(&change);
        tracing::debug!(accessory = %self.display_name, on, edge, "Set Characteristic On");
        self.update_device(&change).await;
    }

    /// Sets the hue; values wrap at 360.
    pub async fn set_hue(&self, hue: u16) {
        tracing::debug!(accessory = %self.display_name, hue, "Set Characteristic Hue");
        self.set_color_channel(StateChange::Hue(hue)).await;
    }

    /// Sets the saturation; values above 100 are clamped.
    pub async fn set_saturation(&self, saturation: u8) {
        tracing::debug!(accessory = %self.display_name, saturation, "Set Characteristic Saturation");
        self.set_color_channel(StateChange::Saturation(saturation)).await;
    }

    /// Sets the brightness; values above 100 are clamped.
    pub async fn set_brightness(&self, brightness: u8) {
        tracing::debug!(accessory = %self.display_name, brightness, "Set Characteristic Brightness");
        self.set_color_channel(StateChange::Brightness(brightness)).await;
    }

    async fn set_color_channel(&self, change: StateChange) {
        self.state.lock().apply(&change);
        self.update_device(&change).await;
    }

    /// Writes the cached state to the device once the debounce delay passed.
    ///
    /// Changes arriving within the delay are merged; only the last one writes.
    async fn update_device(&self, change: &StateChange) {
        let generation = {
            let mut pending = self.pending.lock();
            pending.generation += 1;
            pending.toggling_power |= matches!(change, StateChange::On(_));
            pending.color_changed |= change.is_color_change();
            pending.generation
        };

        tokio::time::sleep(self.update_delay).await;

        let (toggled, color_changed) = {
            let mut pending = self.pending.lock();
            if pending.generation != generation {
                tracing::trace!(accessory = %self.display_name, "Update superseded by a later set");
                return;
            }
            (
                std::mem::take(&mut pending.toggling_power),
                std::mem::take(&mut pending.color_changed),
            )
        };

        let state = self.state();
        let (last_powered_mode_id, last_powered_rgb_color) = {
            let context = self.context.read();
            (context.last_powered_mode_id, context.last_powered_rgb_color)
        };
        let request = UpdateRequest {
            // switching on while picking a color shows the picked color
            toggling_power: toggled && !(state.is_on() && color_changed),
            on: state.is_on(),
            candidate: state.rgb(),
            last_powered_mode_id,
            last_powered_rgb_color,
        };

        let id = self.id;
        let context = Arc::clone(&self.context);
        let _ = self
            .session(move |client, snapshots| {
                Box::pin(async move {
                    let Some(device) = resolve(&snapshots, id) else {
                        tracing::debug!(accessory = %id, "Device not reported by its server, skipping update");
                        return;
                    };
                    let plan = plan_update(device, &request);
                    if let Err(e) = write_plan(client, device, &plan, &context).await {
                        tracing::warn!(device = %device.name, error = %e, "Failed to set light color on device");
                    }
                })
            })
            .await;
    }

    async fn session<F, R>(&self, action: F) -> Result<R, ProtocolError>
    where
        F: for<'a> FnOnce(&'a mut C::Client, Vec<ControllerSnapshot>) -> BoxFuture<'a, R> + Send,
        R: Send,
    {
        let server = self.context.read().server.clone();
        with_connection(self.connector.as_ref(), &server, self.connection_timeout, action).await
    }
}

/// Writes the mode then the LED colors, remembering what was written.
async fn write_plan<W: WireClient>(
    client: &mut W,
    device: &ControllerSnapshot,
    plan: &UpdatePlan,
    context: &SharedContext,
) -> Result<(), ProtocolError> {
    if let Some(mode) = plan.mode {
        client.update_mode(device.device_id, mode).await?;
        if Some(mode) != device.off_mode_id() {
            context.write().last_powered_mode_id = Some(mode);
        }
    }

    let colors = vec![plan.color; device.colors.len()];
    client.update_leds(device.device_id, &colors).await?;
    if !plan.color.is_off() {
        context.write().last_powered_rgb_color = Some(plan.color);
    }
    Ok(())
}

impl<C: Connector> std::fmt::Debug for LightAccessory<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightAccessory")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
