// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deciding which mode and color to write to a device.
//!
//! | toggling power | on    | last mode known | Direct declared | mode written      | color written                  |
//! |----------------|-------|-----------------|-----------------|-------------------|--------------------------------|
//! | yes            | true  | yes             | any             | last powered mode | last powered color, else state |
//! | yes            | true  | no              | yes             | Direct            | last powered color, else state |
//! | yes            | true  | no              | no              | unchanged         | last powered color, else state |
//! | yes            | false | any             | any             | Off if declared   | black                          |
//! | no             | any   | any             | yes             | Direct            | state                          |
//! | no             | any   | any             | no              | unchanged         | state                          |

use crate::controller::ControllerSnapshot;
use crate::types::RgbColor;

/// What the accessory wants to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRequest {
    /// The write switches the light on or off.
    pub toggling_power: bool,
    /// Cached power state.
    pub on: bool,
    /// Cached color converted to RGB.
    pub candidate: RgbColor,
    /// Last mode other than "Off" the device was in.
    pub last_powered_mode_id: Option<u32>,
    /// Last non-black color the device showed.
    pub last_powered_rgb_color: Option<RgbColor>,
}

/// Mode and color to write, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatePlan {
    /// Mode to activate, `None` to leave the mode alone.
    pub mode: Option<u32>,
    /// Color for every LED.
    pub color: RgbColor,
}

/// Plans the writes for `request` on `device`.
///
/// # Examples
///
/// ```
/// use openrgb_bridge::accessory::{plan_update, UpdatePlan, UpdateRequest};
/// use openrgb_bridge::controller::{ControllerMode, ControllerSnapshot};
/// use openrgb_bridge::types::RgbColor;
///
/// let device = ControllerSnapshot::new(0, "Strip")
///     .with_modes(vec![ControllerMode::new(0, "Direct"), ControllerMode::new(1, "Off")]);
/// let request = UpdateRequest {
///     toggling_power: true,
///     on: false,
///     candidate: RgbColor::white(),
///     last_powered_mode_id: Some(0),
///     last_powered_rgb_color: None,
/// };
///
/// assert_eq!(
///     plan_update(&device, &request),
///     UpdatePlan { mode: Some(1), color: RgbColor::black() }
/// );
/// ```
#[must_use]
pub fn plan_update(device: &ControllerSnapshot, request: &UpdateRequest) -> UpdatePlan {
    if request.toggling_power && !request.on {
        return UpdatePlan {
            mode: device.off_mode_id(),
            color: RgbColor::black(),
        };
    }

    if request.toggling_power {
        return UpdatePlan {
            mode: request.last_powered_mode_id.or_else(|| device.direct_mode_id()),
            color: request.last_powered_rgb_color.unwrap_or(request.candidate),
        };
    }

    UpdatePlan {
        mode: device.direct_mode_id(),
        color: request.candidate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerMode;

    const RED: RgbColor = RgbColor::new(255, 0, 0);
    const BLUE: RgbColor = RgbColor::new(0, 0, 255);

    fn full_device() -> ControllerSnapshot {
        ControllerSnapshot::new(0, "Strip").with_modes(vec![
            ControllerMode::new(0, "Direct"),
            ControllerMode::new(1, "Off"),
            ControllerMode::new(2, "Rainbow"),
        ])
    }

    fn bare_device() -> ControllerSnapshot {
        ControllerSnapshot::new(0, "Fan").with_modes(vec![ControllerMode::new(0, "Static")])
    }

    fn request(toggling_power: bool, on: bool) -> UpdateRequest {
        UpdateRequest {
            toggling_power,
            on,
            candidate: RED,
            last_powered_mode_id: None,
            last_powered_rgb_color: None,
        }
    }

    #[test]
    fn power_on_restores_last_mode_and_color() {
        let request = UpdateRequest {
            last_powered_mode_id: Some(2),
            last_powered_rgb_color: Some(BLUE),
            ..request(true, true)
        };
        assert_eq!(
            plan_update(&full_device(), &request),
            UpdatePlan {
                mode: Some(2),
                color: BLUE
            }
        );
    }

    #[test]
    fn power_on_without_memory_uses_direct_and_state() {
        assert_eq!(
            plan_update(&full_device(), &request(true, true)),
            UpdatePlan {
                mode: Some(0),
                color: RED
            }
        );
    }

    #[test]
    fn power_on_without_direct_keeps_mode() {
        let request = UpdateRequest {
            last_powered_rgb_color: Some(BLUE),
            ..request(true, true)
        };
        assert_eq!(
            plan_update(&bare_device(), &request),
            UpdatePlan {
                mode: None,
                color: BLUE
            }
        );
    }

    #[test]
    fn power_off_writes_off_and_black() {
        let request = UpdateRequest {
            last_powered_mode_id: Some(2),
            ..request(true, false)
        };
        assert_eq!(
            plan_update(&full_device(), &request),
            UpdatePlan {
                mode: Some(1),
                color: RgbColor::black()
            }
        );
    }

    #[test]
    fn power_off_without_off_mode_only_blacks_out() {
        assert_eq!(
            plan_update(&bare_device(), &request(true, false)),
            UpdatePlan {
                mode: None,
                color: RgbColor::black()
            }
        );
    }

    #[test]
    fn color_edit_switches_to_direct() {
        let request = UpdateRequest {
            last_powered_mode_id: Some(2),
            last_powered_rgb_color: Some(BLUE),
            ..request(false, true)
        };
        assert_eq!(
            plan_update(&full_device(), &request),
            UpdatePlan {
                mode: Some(0),
                color: RED
            }
        );
    }

    #[test]
    fn color_edit_without_direct_keeps_mode() {
        assert_eq!(
            plan_update(&bare_device(), &request(false, false)),
            UpdatePlan {
                mode: None,
                color: RED
            }
        );
    }
}
