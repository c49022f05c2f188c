// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Routing of inbound bus messages to the command queue.

use tokio::sync::mpsc;

use crate::command::{CommandBuilder, CommandQueue};
use crate::protocol::InboundMessage;
use crate::state::StateStore;
use crate::types::Attribute;

/// What the router did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A command was queued for the attribute.
    Queued(Attribute),
    /// The value already matches the stored state.
    Suppressed(Attribute),
    /// The value is not valid for the attribute.
    Rejected(Attribute),
    /// The trailing topic segment is not an attribute.
    UnknownAttribute,
    /// The topic is not below the configured prefix.
    OutsidePrefix,
}

/// Turns bus messages into queued commands.
///
/// The trailing topic segment names the attribute and the payload,
/// uppercased, is the desired value. Values equal to the stored state are
/// dropped, which also swallows the echo of the bridge's own publishes.
///
/// # Examples
///
/// ```
/// use hifi_bridge::command::{CommandBuilder, CommandQueue};
/// use hifi_bridge::router::{MessageRouter, RouteOutcome};
/// use hifi_bridge::state::StateStore;
/// use hifi_bridge::types::Attribute;
///
/// let store = StateStore::new();
/// let queue = CommandQueue::new();
/// let router = MessageRouter::new("/hifi/", store.clone(), queue.clone(), CommandBuilder::new(60));
///
/// assert_eq!(router.route("/hifi/power", "on"), RouteOutcome::Queued(Attribute::Power));
/// assert_eq!(store.get(Attribute::Power), "ON");
///
/// // Same value again: nothing to do.
/// assert_eq!(router.route("/hifi/power", "ON"), RouteOutcome::Suppressed(Attribute::Power));
/// assert_eq!(queue.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MessageRouter {
    prefix: String,
    store: StateStore,
    queue: CommandQueue,
    builder: CommandBuilder,
}

impl MessageRouter {
    /// Creates a router for topics below `prefix`.
    #[must_use]
    pub fn new(
        prefix: impl Into<String>,
        store: StateStore,
        queue: CommandQueue,
        builder: CommandBuilder,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            store,
            queue,
            builder,
        }
    }

    /// Handles one inbound message.
    pub fn route(&self, topic: &str, payload: &str) -> RouteOutcome {
        let Some(rest) = topic.strip_prefix(self.prefix.as_str()) else {
            tracing::debug!(topic = %topic, "Ignoring message outside topic prefix");
            return RouteOutcome::OutsidePrefix;
        };

        let segment = rest.rsplit('/').next().unwrap_or(rest);
        let Ok(attribute) = segment.parse::<Attribute>() else {
            tracing::warn!(topic = %topic, "Command received for unknown topic");
            return RouteOutcome::UnknownAttribute;
        };

        let value = payload.trim().to_uppercase();
        if self.store.matches(attribute, &value) {
            tracing::debug!(%attribute, value = %value, "Ignoring message, no status change");
            return RouteOutcome::Suppressed(attribute);
        }

        match self.builder.build(attribute, &value) {
            Ok(command) => {
                if let Some(change) = command.state_change() {
                    self.store.apply(&change);
                }
                self.queue.enqueue(command);
                RouteOutcome::Queued(attribute)
            }
            Err(e) => {
                tracing::warn!(%attribute, value = %value, error = %e, "Rejected command");
                RouteOutcome::Rejected(attribute)
            }
        }
    }

    /// Routes messages until the sending side closes.
    pub async fn run(self, mut inbound: mpsc::Receiver<InboundMessage>) {
        while let Some(message) = inbound.recv().await {
            self.route(&message.topic, &message.payload);
        }
        tracing::info!("Inbound message channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::PendingCommand;
    use crate::types::{Band, MuteState};

    fn router() -> (MessageRouter, StateStore, CommandQueue) {
        let store = StateStore::new();
        let queue = CommandQueue::new();
        let router = MessageRouter::new(
            "/hifi/",
            store.clone(),
            queue.clone(),
            CommandBuilder::new(60),
        );
        (router, store, queue)
    }

    #[test]
    fn queues_and_applies_optimistic_update() {
        let (router, store, queue) = router();

        assert_eq!(router.route("/hifi/band", "fm"), RouteOutcome::Queued(Attribute::Band));

        assert_eq!(store.get(Attribute::Band), "FM");
        assert_eq!(queue.dequeue_one(), Some(PendingCommand::Band(Band::Fm)));
    }

    #[test]
    fn matching_value_is_suppressed() {
        let (router, store, queue) = router();
        store.set(Attribute::Mute, "ON");

        assert_eq!(
            router.route("/hifi/mute", " on "),
            RouteOutcome::Suppressed(Attribute::Mute)
        );
        assert!(queue.is_empty());

        assert_eq!(router.route("/hifi/mute", "off"), RouteOutcome::Queued(Attribute::Mute));
        assert_eq!(queue.dequeue_one(), Some(PendingCommand::Mute(MuteState::Off)));
    }

    #[test]
    fn volume_is_not_stored_optimistically() {
        let (router, store, queue) = router();

        assert_eq!(router.route("/hifi/volume", "50"), RouteOutcome::Queued(Attribute::Volume));

        assert_eq!(store.get(Attribute::Volume), "");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn invalid_values_change_nothing() {
        let (router, store, queue) = router();

        assert_eq!(
            router.route("/hifi/volume", "0"),
            RouteOutcome::Rejected(Attribute::Volume)
        );
        assert_eq!(
            router.route("/hifi/source", "cd"),
            RouteOutcome::Rejected(Attribute::Source)
        );
        assert_eq!(
            router.route("/hifi/playing", "anything"),
            RouteOutcome::Rejected(Attribute::Playing)
        );
        assert!(queue.is_empty());
        assert_eq!(store.get(Attribute::Source), "");
    }

    #[test]
    fn unknown_segment_is_dropped() {
        let (router, store, queue) = router();

        assert_eq!(
            router.route("/hifi/brightness", "50"),
            RouteOutcome::UnknownAttribute
        );
        assert!(queue.is_empty());
        assert_eq!(store.snapshot(), crate::state::DeviceState::new());
    }

    #[test]
    fn attribute_segment_is_case_insensitive() {
        let (router, _, queue) = router();
        assert_eq!(router.route("/hifi/POWER", "on"), RouteOutcome::Queued(Attribute::Power));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn topics_outside_prefix_are_ignored() {
        let (router, _, queue) = router();
        assert_eq!(router.route("/other/power", "ON"), RouteOutcome::OutsidePrefix);
        assert!(queue.is_empty());
    }

    #[test]
    fn favorite_repeats_are_queued() {
        let (router, _, queue) = router();
        router.route("/hifi/favorite", "1");
        router.route("/hifi/favorite", "1");
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn run_drains_channel() {
        let (router, store, queue) = router();
        let (tx, rx) = mpsc::channel(4);

        tx.send(InboundMessage {
            topic: "/hifi/power".to_string(),
            payload: "ON".to_string(),
        })
        .await
        .unwrap();
        tx.send(InboundMessage {
            topic: "/hifi/power".to_string(),
            payload: "ON".to_string(),
        })
        .await
        .unwrap();
        drop(tx);

        router.run(rx).await;

        assert_eq!(queue.len(), 1);
        assert_eq!(store.get(Attribute::Power), "ON");
    }
}
