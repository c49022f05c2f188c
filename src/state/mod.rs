// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Receiver state management types.
//!
//! [`DeviceState`] holds one value per attribute, [`StateChange`] describes a
//! single update, and [`StateStore`] is the shared owner handed to the
//! router and the scheduler.
//!
//! # Examples
//!
//! ```
//! use hifi_bridge::state::{StateChange, StateStore};
//! use hifi_bridge::types::{Attribute, PowerState};
//!
//! let store = StateStore::new();
//! assert!(store.apply(&StateChange::power(PowerState::On)));
//! assert_eq!(store.get(Attribute::Power), "ON");
//! ```

mod device_state;
mod state_change;
mod store;

pub use device_state::DeviceState;
pub use state_change::StateChange;
pub use store::StateStore;
