// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! FIFO of commands waiting for the receiver.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::PendingCommand;

/// Unbounded first-in-first-out queue of validated commands.
///
/// The router appends from the MQTT task and the scheduler drains one entry
/// per tick. Cloning is cheap and every clone refers to the same queue.
/// Duplicates are kept: two identical requests are sent twice.
///
/// # Examples
///
/// ```
/// use hifi_bridge::command::{CommandQueue, PendingCommand};
/// use hifi_bridge::types::PowerState;
///
/// let queue = CommandQueue::new();
/// queue.enqueue(PendingCommand::Power(PowerState::On));
/// queue.enqueue(PendingCommand::Power(PowerState::Off));
///
/// assert_eq!(queue.dequeue_one(), Some(PendingCommand::Power(PowerState::On)));
/// assert_eq!(queue.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    inner: Arc<Mutex<VecDeque<PendingCommand>>>,
}

impl CommandQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command at the back of the queue.
    pub fn enqueue(&self, command: PendingCommand) {
        let mut queue = self.inner.lock();
        queue.push_back(command);
        tracing::debug!(depth = queue.len(), "Command queued");
    }

    /// Removes the oldest command, if any.
    #[must_use]
    pub fn dequeue_one(&self) -> Option<PendingCommand> {
        self.inner.lock().pop_front()
    }

    /// Returns the number of waiting commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if no command is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Band, MuteState};

    #[test]
    fn preserves_fifo_order() {
        let queue = CommandQueue::new();
        queue.enqueue(PendingCommand::Band(Band::Fm));
        queue.enqueue(PendingCommand::Mute(MuteState::On));
        queue.enqueue(PendingCommand::Band(Band::Dab));

        assert_eq!(queue.dequeue_one(), Some(PendingCommand::Band(Band::Fm)));
        assert_eq!(queue.dequeue_one(), Some(PendingCommand::Mute(MuteState::On)));
        assert_eq!(queue.dequeue_one(), Some(PendingCommand::Band(Band::Dab)));
        assert_eq!(queue.dequeue_one(), None);
    }

    #[test]
    fn duplicates_are_not_coalesced() {
        let queue = CommandQueue::new();
        queue.enqueue(PendingCommand::Favorite("1".to_string()));
        queue.enqueue(PendingCommand::Favorite("1".to_string()));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn clones_share_the_queue() {
        let queue = CommandQueue::new();
        let producer = queue.clone();
        producer.enqueue(PendingCommand::Mute(MuteState::Off));
        assert!(!queue.is_empty());
        assert!(queue.dequeue_one().is_some());
        assert!(producer.is_empty());
    }
}
