// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::protocol::BusPublisher;
use crate::state::StateStore;
use crate::types::Attribute;

use super::StatusSnapshot;

/// Commits refreshed values to the store and publishes the ones that moved.
///
/// The comparison is against the store, which already holds any optimistic
/// updates, so a command that landed as expected publishes nothing.
#[derive(Debug, Clone)]
pub struct ChangePublisher<B> {
    bus: B,
    store: StateStore,
    topic_prefix: String,
}

impl<B: BusPublisher> ChangePublisher<B> {
    /// Creates a publisher writing below `topic_prefix`.
    #[must_use]
    pub fn new(bus: B, store: StateStore, topic_prefix: impl Into<String>) -> Self {
        Self {
            bus,
            store,
            topic_prefix: topic_prefix.into(),
        }
    }

    /// Returns the topic an attribute is published on.
    #[must_use]
    pub fn topic_for(&self, attribute: Attribute) -> String {
        format!("{}{}", self.topic_prefix, attribute.as_str())
    }

    /// Returns the store this publisher commits to.
    #[must_use]
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Commits a snapshot and publishes every attribute whose value changed.
    ///
    /// The store is updated before publishing and is not rolled back when a
    /// publish fails. Returns the number of changed attributes.
    pub async fn publish_changes(&self, snapshot: &StatusSnapshot) -> usize {
        let mut changed = 0;

        for (attribute, value) in snapshot.iter() {
            if !self.store.set(attribute, value) {
                continue;
            }
            changed += 1;

            let topic = self.topic_for(attribute);
            tracing::info!(topic = %topic, value = %value, "State changed");

            if let Err(e) = self.bus.publish(&topic, value).await {
                tracing::warn!(topic = %topic, error = %e, "Failed to publish state");
            }
        }

        changed
    }
}
