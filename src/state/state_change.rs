// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! # Change Types
//!
//! - [`StateChange::On`] - Power state
//! - [`StateChange::Hue`], [`StateChange::Saturation`], [`StateChange::Brightness`] -
//!   single color channels, as written by the host
//! - [`StateChange::Color`] - all three channels, as read from a device

use crate::types::HsvColor;

/// Represents a change in accessory state.
///
/// Channel values are normalized when applied, the same way
/// [`HsvColor::new`] normalizes them.
///
/// # Examples
///
/// ```
/// use openrgb_bridge::state::StateChange;
/// use openrgb_bridge::types::HsvColor;
///
/// assert!(StateChange::Color(HsvColor::new(240, 100, 50)).is_color_change());
/// assert!(!StateChange::On(true).is_color_change());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StateChange {
    /// Power state changed.
    On(bool),

    /// Hue changed (0-359).
    Hue(u16),

    /// Saturation changed (0-100).
    Saturation(u8),

    /// Brightness changed (0-100).
    Brightness(u8),

    /// All color channels changed.
    Color(HsvColor),
}

impl StateChange {
    /// Returns `true` if this change edits the color rather than the power state.
    #[must_use]
    pub fn is_color_change(&self) -> bool {
        !matches!(self, Self::On(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_changes() {
        assert!(!StateChange::On(true).is_color_change());
        assert!(StateChange::Hue(10).is_color_change());
        assert!(StateChange::Saturation(0).is_color_change());
        assert!(StateChange::Brightness(3).is_color_change());
        assert!(StateChange::Color(HsvColor::default()).is_color_change());
    }

    #[test]
    fn serde_round_trip() {
        let change = StateChange::Color(HsvColor::new(120, 80, 100));
        let json = serde_json::to_string(&change).unwrap();
        let back: StateChange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, change);
    }
}
