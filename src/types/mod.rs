// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color value types.
//!
//! RGB and HSV triples are distinct types so the color space of a value is
//! always known from its type.
//!
//! - [`RgbColor`] - 8-bit per channel color as stored on OpenRGB devices
//! - [`HsvColor`] - Hue 0-359, Saturation 0-100, Brightness 0-100, as shown
//!   by light accessories

mod hsv_color;
mod rgb_color;

pub use hsv_color::HsvColor;
pub use rgb_color::{RgbColor, hsv_to_rgb, rgb_to_hsv};
