// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mode lookup by name.

use super::ControllerSnapshot;

/// Name of the mode that shows per-LED colors set over the SDK as-is.
pub const DIRECT_MODE: &str = "Direct";

/// Name of the mode equivalent to the light being switched off.
pub const OFF_MODE: &str = "Off";

/// Finds the id of the first mode whose name matches `name`.
///
/// Matching ignores case and surrounding whitespace on both sides. When a
/// controller declares several modes with the same name, the first one in
/// the order reported by the controller wins.
///
/// # Examples
///
/// ```
/// use openrgb_bridge::controller::{find_mode_id, ControllerMode, ControllerSnapshot};
///
/// let snapshot = ControllerSnapshot::new(0, "Keyboard")
///     .with_modes(vec![ControllerMode::new(0, " DIRECT "), ControllerMode::new(1, "Off")]);
///
/// assert_eq!(find_mode_id(&snapshot, "direct"), Some(0));
/// assert_eq!(find_mode_id(&snapshot, "Rainbow"), None);
/// ```
#[must_use]
pub fn find_mode_id(snapshot: &ControllerSnapshot, name: &str) -> Option<u32> {
    let wanted = name.trim().to_lowercase();
    snapshot
        .modes
        .iter()
        .find(|mode| mode.name.trim().to_lowercase() == wanted)
        .map(|mode| mode.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerMode;

    #[test]
    fn matches_case_insensitively() {
        let snapshot =
            ControllerSnapshot::new(0, "Ram").with_modes(vec![ControllerMode::new(4, "off")]);
        assert_eq!(find_mode_id(&snapshot, OFF_MODE), Some(4));
        assert_eq!(find_mode_id(&snapshot, "OFF"), Some(4));
    }

    #[test]
    fn trims_whitespace() {
        let snapshot =
            ControllerSnapshot::new(0, "Ram").with_modes(vec![ControllerMode::new(2, "  Direct\t")]);
        assert_eq!(find_mode_id(&snapshot, " direct "), Some(2));
    }

    #[test]
    fn requires_exact_name() {
        let snapshot = ControllerSnapshot::new(0, "Ram")
            .with_modes(vec![ControllerMode::new(0, "Direct Control")]);
        assert_eq!(find_mode_id(&snapshot, DIRECT_MODE), None);
    }

    #[test]
    fn first_duplicate_wins() {
        let snapshot = ControllerSnapshot::new(0, "Ram").with_modes(vec![
            ControllerMode::new(3, "Static"),
            ControllerMode::new(5, "Direct"),
            ControllerMode::new(1, "direct"),
        ]);
        assert_eq!(find_mode_id(&snapshot, DIRECT_MODE), Some(5));
    }

    #[test]
    fn no_modes_means_not_found() {
        let snapshot = ControllerSnapshot::new(0, "Ram");
        assert_eq!(find_mode_id(&snapshot, OFF_MODE), None);
    }
}
