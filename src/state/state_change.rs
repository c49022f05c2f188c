// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! A [`StateChange`] is one attribute taking one value. Changes come from two
//! places: accepted commands whose outcome is known in advance (optimistic
//! updates) and status refreshes.
//!
//! # Examples
//!
//! ```
//! use hifi_bridge::state::{DeviceState, StateChange};
//! use hifi_bridge::types::{Attribute, PowerState};
//!
//! let mut state = DeviceState::new();
//!
//! // Apply returns true if state actually changed
//! assert!(state.apply(&StateChange::power(PowerState::On)));
//!
//! // Applying same change again returns false
//! assert!(!state.apply(&StateChange::power(PowerState::On)));
//! assert_eq!(state.get(Attribute::Power), "ON");
//! ```

use std::fmt;

use crate::types::{Attribute, Band, MuteState, PowerState, Source};

/// One attribute taking one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    attribute: Attribute,
    value: String,
}

impl StateChange {
    /// Creates a change for any attribute.
    #[must_use]
    pub fn new(attribute: Attribute, value: impl Into<String>) -> Self {
        Self {
            attribute,
            value: value.into(),
        }
    }

    /// Creates a power change.
    #[must_use]
    pub fn power(state: PowerState) -> Self {
        Self::new(Attribute::Power, state.as_str())
    }

    /// Creates a mute change.
    #[must_use]
    pub fn mute(state: MuteState) -> Self {
        Self::new(Attribute::Mute, state.as_str())
    }

    /// Creates a source change.
    #[must_use]
    pub fn source(source: Source) -> Self {
        Self::new(Attribute::Source, source.as_str())
    }

    /// Creates a band change.
    #[must_use]
    pub fn band(band: Band) -> Self {
        Self::new(Attribute::Band, band.as_str())
    }

    /// Returns the attribute that changes.
    #[must_use]
    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    /// Returns the new value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, self.value)
    }
}
