// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory state tracking.

use crate::types::{HsvColor, RgbColor};

use super::StateChange;

/// The state a light accessory presents to the host.
///
/// Starts off and black. The HSV color is kept while the light is off, so
/// turning it back on can restore it.
///
/// # Examples
///
/// ```
/// use openrgb_bridge::state::{AccessoryState, StateChange};
/// use openrgb_bridge::types::RgbColor;
///
/// let mut state = AccessoryState::new();
/// state.apply(&StateChange::Hue(120));
/// state.apply(&StateChange::Saturation(80));
/// state.apply(&StateChange::Brightness(100));
///
/// assert_eq!(state.rgb(), RgbColor::new(51, 255, 51));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AccessoryState {
    on: bool,
    hsv: HsvColor,
}

impl AccessoryState {
    /// Creates a state that is off with all channels at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the light is on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Returns the cached color.
    #[must_use]
    pub fn hsv(&self) -> HsvColor {
        self.hsv
    }

    /// Returns the cached color converted to RGB.
    #[must_use]
    pub fn rgb(&self) -> RgbColor {
        RgbColor::from_hsv(&self.hsv)
    }

    /// Applies a change and returns `true` if anything changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        let before = *self;
        match change {
            StateChange::On(on) => self.on = *on,
            StateChange::Hue(hue) => self.hsv = self.hsv.with_hue(*hue),
            StateChange::Saturation(saturation) => {
                self.hsv = self.hsv.with_saturation(*saturation);
            }
            StateChange::Brightness(brightness) => {
                self.hsv = self.hsv.with_brightness(*brightness);
            }
            StateChange::Color(hsv) => self.hsv = *hsv,
        }
        *self != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_off_and_black() {
        let state = AccessoryState::new();
        assert!(!state.is_on());
        assert_eq!(state.hsv(), HsvColor::new(0, 0, 0));
        assert!(state.rgb().is_off());
    }

    #[test]
    fn apply_reports_changes() {
        let mut state = AccessoryState::new();
        assert!(state.apply(&StateChange::On(true)));
        assert!(!state.apply(&StateChange::On(true)));
        assert!(state.apply(&StateChange::Brightness(40)));
        assert!(!state.apply(&StateChange::Brightness(40)));
    }

    #[test]
    fn channels_are_normalized() {
        let mut state = AccessoryState::new();
        state.apply(&StateChange::Hue(400));
        state.apply(&StateChange::Saturation(250));
        assert_eq!(state.hsv().hue(), 40);
        assert_eq!(state.hsv().saturation(), 100);
    }

    #[test]
    fn power_off_keeps_color() {
        let mut state = AccessoryState::new();
        state.apply(&StateChange::On(true));
        state.apply(&StateChange::Color(HsvColor::new(200, 50, 70)));
        state.apply(&StateChange::On(false));
        assert_eq!(state.hsv(), HsvColor::new(200, 50, 70));
    }
}
