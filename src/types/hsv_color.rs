// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HSV color as exposed by light accessories.

use std::fmt;

/// HSV color representation (Hue, Saturation, Brightness/Value).
///
/// Values are normalized at construction: hue wraps into `0..360`,
/// saturation and brightness are clamped to `0..=100`. Accessory
/// characteristics never fail on out-of-range input.
///
/// # Examples
///
/// ```
/// use openrgb_bridge::types::HsvColor;
///
/// let green = HsvColor::new(120, 100, 100);
/// assert_eq!(green.hue(), 120);
///
/// let wrapped = HsvColor::new(360, 150, 50);
/// assert_eq!(wrapped.hue(), 0);
/// assert_eq!(wrapped.saturation(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct HsvColor {
    hue: u16,
    saturation: u8,
    brightness: u8,
}

impl HsvColor {
    /// Hue wraps at this value.
    pub const HUE_RANGE: u16 = 360;

    /// Maximum saturation value.
    pub const MAX_SATURATION: u8 = 100;

    /// Maximum brightness value.
    pub const MAX_BRIGHTNESS: u8 = 100;

    /// Creates a new HSV color, normalizing out-of-range values.
    #[must_use]
    pub const fn new(hue: u16, saturation: u8, brightness: u8) -> Self {
        Self {
            hue: hue % Self::HUE_RANGE,
            saturation: if saturation > Self::MAX_SATURATION {
                Self::MAX_SATURATION
            } else {
                saturation
            },
            brightness: if brightness > Self::MAX_BRIGHTNESS {
                Self::MAX_BRIGHTNESS
            } else {
                brightness
            },
        }
    }

    /// Returns the hue (0-359).
    #[must_use]
    pub const fn hue(&self) -> u16 {
        self.hue
    }

    /// Returns the saturation (0-100).
    #[must_use]
    pub const fn saturation(&self) -> u8 {
        self.saturation
    }

    /// Returns the brightness (0-100).
    #[must_use]
    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Returns a copy with a different hue.
    #[must_use]
    pub const fn with_hue(&self, hue: u16) -> Self {
        Self::new(hue, self.saturation, self.brightness)
    }

    /// Returns a copy with a different saturation.
    #[must_use]
    pub const fn with_saturation(&self, saturation: u8) -> Self {
        Self::new(self.hue, saturation, self.brightness)
    }

    /// Returns a copy with a different brightness.
    #[must_use]
    pub const fn with_brightness(&self, brightness: u8) -> Self {
        Self::new(self.hue, self.saturation, brightness)
    }
}

impl fmt::Display for HsvColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HSV({}, {}%, {}%)",
            self.hue, self.saturation, self.brightness
        )
    }
}
