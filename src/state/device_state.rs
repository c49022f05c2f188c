// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-known receiver state.

use crate::types::Attribute;

use super::StateChange;

/// Last-known value of every attribute.
///
/// There is always exactly one slot per [`Attribute`]. A value that has not
/// been learned yet is the empty string, never a missing entry.
///
/// # Examples
///
/// ```
/// use hifi_bridge::state::DeviceState;
/// use hifi_bridge::types::Attribute;
///
/// let mut state = DeviceState::new();
/// assert_eq!(state.get(Attribute::Volume), "");
///
/// assert!(state.set(Attribute::Volume, "40"));
/// assert!(!state.set(Attribute::Volume, "40"));
/// assert_eq!(state.get(Attribute::Volume), "40");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    values: [String; Attribute::COUNT],
}

impl DeviceState {
    /// Creates a state with every attribute unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value of an attribute.
    #[must_use]
    pub fn get(&self, attribute: Attribute) -> &str {
        &self.values[attribute.index()]
    }

    /// Overwrites an attribute.
    ///
    /// Returns `true` if the new value differs from the previous one.
    pub fn set(&mut self, attribute: Attribute, value: impl Into<String>) -> bool {
        let value = value.into();
        let slot = &mut self.values[attribute.index()];
        let changed = *slot != value;
        *slot = value;
        changed
    }

    /// Applies a state change.
    ///
    /// Returns `true` if the state actually changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        self.set(change.attribute(), change.value())
    }

    /// Returns `true` if the attribute has not been learned yet.
    #[must_use]
    pub fn is_unknown(&self, attribute: Attribute) -> bool {
        self.get(attribute).is_empty()
    }

    /// Iterates over every attribute and its value.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &str)> {
        Attribute::ALL
            .into_iter()
            .map(move |attr| (attr, self.get(attr)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PowerState, Source};

    #[test]
    fn new_state_has_every_attribute_empty() {
        let state = DeviceState::new();
        assert_eq!(state.iter().count(), Attribute::COUNT);
        assert!(state.iter().all(|(_, v)| v.is_empty()));
        assert!(state.is_unknown(Attribute::Power));
    }

    #[test]
    fn set_reports_changes() {
        let mut state = DeviceState::new();
        assert!(state.set(Attribute::Mute, "ON"));
        assert!(!state.set(Attribute::Mute, "ON"));
        assert!(state.set(Attribute::Mute, "OFF"));
        assert_eq!(state.get(Attribute::Mute), "OFF");
    }

    #[test]
    fn set_back_to_empty_is_a_change() {
        let mut state = DeviceState::new();
        state.set(Attribute::Playing, "Song");
        assert!(state.set(Attribute::Playing, ""));
        assert!(state.is_unknown(Attribute::Playing));
    }

    #[test]
    fn attributes_are_independent() {
        let mut state = DeviceState::new();
        state.apply(&StateChange::power(PowerState::On));
        state.apply(&StateChange::source(Source::Tuner));
        assert_eq!(state.get(Attribute::Power), "ON");
        assert_eq!(state.get(Attribute::Source), "TUNER");
        assert_eq!(state.get(Attribute::Band), "");
    }
}
