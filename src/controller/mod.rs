// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller snapshots and the lookups performed on them.
//!
//! A [`ControllerSnapshot`] is a fresh read of one controller taken during a
//! connection session. Snapshots are never cached between sessions by the
//! accessories; each get or set takes a new one.

mod mode;
mod snapshot;

pub use mode::{DIRECT_MODE, OFF_MODE, find_mode_id};
pub use snapshot::{ControllerMode, ControllerSnapshot, ModeSettings, resolve};
