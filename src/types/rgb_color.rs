// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RGB color type and RGB ⇄ HSV conversion.
//!
//! OpenRGB controllers report and accept one RGB triple per LED. The bridge
//! treats a device as a single uniform color and converts it to the HSV
//! model used by the accessory characteristics.

use std::fmt;

use super::HsvColor;

/// RGB color with 8-bit channels (0-255).
///
/// # Examples
///
/// ```
/// use openrgb_bridge::types::RgbColor;
///
/// let color = RgbColor::new(255, 128, 0);
/// assert_eq!(color.red(), 255);
/// assert_eq!(color.to_string(), "#FF8000");
/// assert!(RgbColor::black().is_off());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct RgbColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl RgbColor {
    /// Creates a new RGB color.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Returns `true` if every channel is zero.
    ///
    /// A black LED is how OpenRGB devices look when they are switched off.
    #[must_use]
    pub const fn is_off(&self) -> bool {
        self.red == 0 && self.green == 0 && self.blue == 0
    }

    /// Converts this color to HSV.
    ///
    /// The conversion rounds every channel to a whole number, so converting
    /// to HSV and back is an approximation rather than an exact round trip.
    ///
    /// # Examples
    ///
    /// ```
    /// use openrgb_bridge::types::RgbColor;
    ///
    /// let hsv = RgbColor::new(0, 255, 0).to_hsv();
    /// assert_eq!(hsv.hue(), 120);
    /// assert_eq!(hsv.saturation(), 100);
    /// assert_eq!(hsv.brightness(), 100);
    /// ```
    #[must_use]
    pub fn to_hsv(&self) -> HsvColor {
        let (h, s, v) = rgb_to_hsv(self.red, self.green, self.blue);
        HsvColor::new(h, s, v)
    }

    /// Creates an RGB color from an HSV color.
    #[must_use]
    pub fn from_hsv(hsv: &HsvColor) -> Self {
        let (r, g, b) = hsv_to_rgb(hsv.hue(), hsv.saturation(), hsv.brightness());
        Self::new(r, g, b)
    }

    /// Creates a white color.
    #[must_use]
    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Creates a black color.
    #[must_use]
    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// Packs the color the way the OpenRGB protocol stores it: `0x00BBGGRR`.
    #[must_use]
    pub const fn to_wire(&self) -> u32 {
        u32::from_le_bytes([self.red, self.green, self.blue, 0])
    }

    /// Unpacks a color from its OpenRGB wire representation.
    #[must_use]
    pub const fn from_wire(value: u32) -> Self {
        let [red, green, blue, _] = value.to_le_bytes();
        Self::new(red, green, blue)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl From<(u8, u8, u8)> for RgbColor {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

/// Converts RGB values to HSV.
///
/// Returns (hue: 0-359, saturation: 0-100, value: 0-100). A hue that rounds
/// up to 360 wraps to 0.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::many_single_char_names
)]
#[must_use]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u16, u8, u8) {
    let r = f32::from(r) / 255.0;
    let g = f32::from(g) / 255.0;
    let b = f32::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let value = (max * 100.0).round() as u8;

    let saturation = if max == 0.0 {
        0
    } else {
        ((delta / max) * 100.0).round() as u8
    };

    let hue = if delta < f32::EPSILON {
        0.0
    } else if (max - r).abs() < f32::EPSILON {
        let h = 60.0 * (((g - b) / delta) % 6.0);
        if h < 0.0 { h + 360.0 } else { h }
    } else if (max - g).abs() < f32::EPSILON {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };

    ((hue.round() as u16) % 360, saturation, value)
}

/// Converts HSV values to RGB.
///
/// Takes (hue: 0-360, saturation: 0-100, value: 0-100) and returns
/// (red, green, blue) in 0-255. Out-of-range saturation and value are
/// clamped to 100.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::many_single_char_names
)]
#[must_use]
pub fn hsv_to_rgb(h: u16, s: u8, v: u8) -> (u8, u8, u8) {
    let s = f32::from(s.min(100)) / 100.0;
    let v = f32::from(v.min(100)) / 100.0;
    let h = f32::from(h % 360);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hue_distance(a: u16, b: u16) -> u16 {
        let d = a.abs_diff(b);
        d.min(360 - d)
    }

    #[test]
    fn is_off_only_for_black() {
        assert!(RgbColor::black().is_off());
        assert!(!RgbColor::new(1, 0, 0).is_off());
        assert!(!RgbColor::new(0, 1, 0).is_off());
        assert!(!RgbColor::new(0, 0, 1).is_off());
        assert!(!RgbColor::white().is_off());
    }

    #[test]
    fn is_off_matches_channel_definition() {
        for r in [0u8, 1, 128, 255] {
            for g in [0u8, 1, 128, 255] {
                for b in [0u8, 1, 128, 255] {
                    let color = RgbColor::new(r, g, b);
                    assert_eq!(color.is_off(), r == 0 && g == 0 && b == 0);
                }
            }
        }
    }

    #[test]
    fn rgb_to_hsv_primaries() {
        assert_eq!(rgb_to_hsv(255, 0, 0), (0, 100, 100));
        assert_eq!(rgb_to_hsv(0, 255, 0), (120, 100, 100));
        assert_eq!(rgb_to_hsv(0, 0, 255), (240, 100, 100));
    }

    #[test]
    fn rgb_to_hsv_grays() {
        assert_eq!(rgb_to_hsv(0, 0, 0), (0, 0, 0));
        assert_eq!(rgb_to_hsv(255, 255, 255), (0, 0, 100));
    }

    #[test]
    fn rgb_to_hsv_hue_never_reaches_360() {
        // Just below red on the hue wheel.
        let (h, _, _) = rgb_to_hsv(255, 0, 1);
        assert!(h < 360);
        assert_eq!(h, 0);
    }

    #[test]
    fn hsv_to_rgb_known_values() {
        assert_eq!(hsv_to_rgb(0, 100, 100), (255, 0, 0));
        assert_eq!(hsv_to_rgb(120, 100, 100), (0, 255, 0));
        assert_eq!(hsv_to_rgb(240, 100, 100), (0, 0, 255));
        assert_eq!(hsv_to_rgb(120, 80, 100), (51, 255, 51));
        assert_eq!(hsv_to_rgb(0, 0, 0), (0, 0, 0));
    }

    #[test]
    fn hsv_round_trip_is_bounded() {
        // Error grows as the channels span fewer 8-bit steps; hue is
        // undefined for grays.
        for hue in (0..360).step_by(7) {
            for saturation in 0..=100u8 {
                for value in 0..=100u8 {
                    let (r, g, b) = hsv_to_rgb(hue, saturation, value);
                    let (h2, s2, v2) = rgb_to_hsv(r, g, b);
                    let max = f32::from(r.max(g).max(b));
                    let delta = max - f32::from(r.min(g).min(b));

                    assert!(value.abs_diff(v2) <= 1, "value {hue},{saturation},{value} -> {v2}");
                    if max > 0.0 {
                        assert!(
                            f32::from(saturation.abs_diff(s2)) <= 100.0 / max + 1.0,
                            "saturation {hue},{saturation},{value} -> {s2}"
                        );
                    }
                    if delta > 0.0 {
                        assert!(
                            f32::from(hue_distance(hue, h2)) <= 120.0 / delta + 1.0,
                            "hue {hue},{saturation},{value} -> {h2}"
                        );
                    }
                    if saturation >= 50 && value >= 50 {
                        assert!(hue_distance(hue, h2) <= 2);
                        assert!(saturation.abs_diff(s2) <= 1);
                    }
                }
            }
        }
    }

    #[test]
    fn wire_packing() {
        let color = RgbColor::new(0x12, 0x34, 0x56);
        assert_eq!(color.to_wire(), 0x0056_3412);
        assert_eq!(RgbColor::from_wire(0x0056_3412), color);
        assert_eq!(RgbColor::from_wire(0xFF00_0000), RgbColor::black());
    }

    #[test]
    fn display_as_hex() {
        assert_eq!(RgbColor::new(255, 128, 0).to_string(), "#FF8000");
    }

    #[test]
    fn from_tuple() {
        let color: RgbColor = (1u8, 2u8, 3u8).into();
        assert_eq!(color, RgbColor::new(1, 2, 3));
    }
}
