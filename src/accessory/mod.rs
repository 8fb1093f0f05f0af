// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light accessories backed by RGB controllers.
//!
//! - [`LightAccessory`] handles characteristic gets and sets for one controller
//! - [`AccessoryRecord`] is the persisted form hosts keep between runs
//! - [`plan_update`] decides which mode and color a set writes

mod context;
mod light;
mod update_plan;

pub use context::{
    AccessoryContext, AccessoryInformation, AccessoryRecord, DEFAULT_DEVICE_NAME, SharedContext,
    display_name,
};
pub use light::LightAccessory;
pub use update_plan::{UpdatePlan, UpdateRequest, plan_update};
