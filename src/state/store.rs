// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared handle to the last-known receiver state.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::Attribute;

use super::{DeviceState, StateChange};

/// Owner of the [`DeviceState`], shared between the router and the scheduler.
///
/// Cloning is cheap and every clone refers to the same state. Inbound bus
/// messages read it (and apply optimistic updates) from the MQTT task while
/// the scheduler commits refreshed values from the tick loop.
///
/// # Examples
///
/// ```
/// use hifi_bridge::state::StateStore;
/// use hifi_bridge::types::Attribute;
///
/// let store = StateStore::new();
/// let shared = store.clone();
///
/// assert!(store.set(Attribute::Source, "TUNER"));
/// assert_eq!(shared.get(Attribute::Source), "TUNER");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    inner: Arc<RwLock<DeviceState>>,
}

impl StateStore {
    /// Creates a store with every attribute unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value of an attribute.
    #[must_use]
    pub fn get(&self, attribute: Attribute) -> String {
        self.inner.read().get(attribute).to_string()
    }

    /// Returns `true` if the stored value equals `value`.
    #[must_use]
    pub fn matches(&self, attribute: Attribute, value: &str) -> bool {
        self.inner.read().get(attribute) == value
    }

    /// Overwrites an attribute, returning `true` if the value changed.
    pub fn set(&self, attribute: Attribute, value: impl Into<String>) -> bool {
        self.inner.write().set(attribute, value)
    }

    /// Applies a state change, returning `true` if the value changed.
    pub fn apply(&self, change: &StateChange) -> bool {
        self.inner.write().apply(change)
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> DeviceState {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MuteState;

    #[test]
    fn clones_share_state() {
        let store = StateStore::new();
        let other = store.clone();
        store.apply(&StateChange::mute(MuteState::On));
        assert_eq!(other.get(Attribute::Mute), "ON");
        assert!(other.matches(Attribute::Mute, "ON"));
    }

    #[test]
    fn set_always_overwrites() {
        let store = StateStore::new();
        assert!(store.set(Attribute::Volume, "10"));
        assert!(store.set(Attribute::Volume, "20"));
        assert!(!store.set(Attribute::Volume, "20"));
        assert_eq!(store.get(Attribute::Volume), "20");
    }

    #[test]
    fn snapshot_is_detached() {
        let store = StateStore::new();
        store.set(Attribute::Band, "FM");
        let snapshot = store.snapshot();
        store.set(Attribute::Band, "DA");
        assert_eq!(snapshot.get(Attribute::Band), "FM");
    }
}
