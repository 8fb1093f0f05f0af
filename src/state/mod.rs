// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory state types.
//!
//! [`AccessoryState`] is the On/Hue/Saturation/Brightness view a light
//! accessory presents to the host. It is kept in memory only and updated
//! through [`StateChange`] values, either from characteristic writes or from
//! fresh device reads.
//!
//! # Examples
//!
//! ```
//! use openrgb_bridge::state::{AccessoryState, StateChange};
//!
//! let mut state = AccessoryState::new();
//!
//! assert!(state.apply(&StateChange::On(true)));
//! assert!(state.apply(&StateChange::Hue(120)));
//!
//! assert!(state.is_on());
//! assert_eq!(state.hsv().hue(), 120);
//! ```

mod accessory_state;
mod state_change;

pub use accessory_state::AccessoryState;
pub use state_change::StateChange;
