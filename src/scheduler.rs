// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The tick-driven scheduler that owns the receiver.
//!
//! Every tick does at most one thing:
//!
//! 1. If a command is queued, send it. After a power-on command the
//!    scheduler holds off for a number of ticks while the amplifier warms up.
//! 2. Otherwise, advance the refresh counter. Once it reaches the refresh
//!    period, query the receiver's status, publish what changed and reset
//!    the counter.
//!
//! Ticks are awaited one after the other, so the receiver never sees two
//! requests at once. Failures are logged and cost only the tick they
//! happened in.
//!
//! # Examples
//!
//! ```no_run
//! use hifi_bridge::command::CommandQueue;
//! use hifi_bridge::protocol::{HttpConfig, MqttBroker};
//! use hifi_bridge::scheduler::{Scheduler, SchedulerConfig};
//! use hifi_bridge::state::StateStore;
//! use hifi_bridge::status::{ChangePublisher, StatusFetcher};
//!
//! # async fn example() -> hifi_bridge::Result<()> {
//! let (broker, _inbound) = MqttBroker::builder().host("localhost").build().await?;
//! let transport = HttpConfig::new("192.168.1.20").into_client()?;
//! let publisher = ChangePublisher::new(broker, StateStore::new(), "/hifi/");
//!
//! let mut scheduler = Scheduler::new(
//!     transport,
//!     StatusFetcher::new(60),
//!     publisher,
//!     CommandQueue::new(),
//!     SchedulerConfig::default(),
//! );
//! scheduler.run().await;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::command::{Command, CommandQueue, PendingCommand};
use crate::protocol::{BusPublisher, DeviceTransport};
use crate::status::{ChangePublisher, StatusFetcher};
use crate::types::Attribute;

/// Timing of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    tick_interval: Duration,
    refresh_period: u32,
    power_on_cooldown: u32,
}

impl SchedulerConfig {
    /// Default tick period.
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
    /// Default number of idle ticks per status refresh.
    pub const DEFAULT_REFRESH_PERIOD: u32 = 10;
    /// Default number of ticks skipped after a power-on command.
    pub const DEFAULT_POWER_ON_COOLDOWN: u32 = 4;

    /// Creates a configuration with default timing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tick period.
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Sets the number of idle ticks per refresh. The refresh runs on the last of them.
    #[must_use]
    pub fn with_refresh_period(mut self, ticks: u32) -> Self {
        self.refresh_period = ticks;
        self
    }

    /// Sets the number of ticks skipped after a power-on command.
    #[must_use]
    pub fn with_power_on_cooldown(mut self, ticks: u32) -> Self {
        self.power_on_cooldown = ticks;
        self
    }

    /// Returns the tick period.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Returns the number of idle ticks per refresh.
    #[must_use]
    pub fn refresh_period(&self) -> u32 {
        self.refresh_period
    }

    /// Returns the number of ticks skipped after a power-on command.
    #[must_use]
    pub fn power_on_cooldown(&self) -> u32 {
        self.power_on_cooldown
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
            refresh_period: Self::DEFAULT_REFRESH_PERIOD,
            power_on_cooldown: Self::DEFAULT_POWER_ON_COOLDOWN,
        }
    }
}

/// What the scheduler is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// Waiting for the next tick.
    #[default]
    Idle,
    /// A command request is in flight.
    ExecutingCommand,
    /// A status refresh is in flight.
    Refreshing,
    /// The receiver is warming up; ticks before `resume_at` do nothing.
    PostPowerOnCooldown {
        /// First tick that may dispatch again.
        resume_at: u64,
    },
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A queued command was sent and accepted.
    Executed(Attribute),
    /// A queued command was sent and failed. It is not retried.
    ExecutionFailed(Attribute),
    /// The status was refreshed.
    Refreshed {
        /// Number of attributes whose value changed.
        published: usize,
    },
    /// The status refresh failed. Stored state is untouched.
    RefreshFailed,
    /// The tick fell inside a power-on cooldown.
    Cooldown,
    /// Nothing to do; the refresh counter advanced.
    Idle,
}

impl fmt::Display for TickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executed(attr) => write!(f, "executed {attr}"),
            Self::ExecutionFailed(attr) => write!(f, "failed {attr}"),
            Self::Refreshed { published } => write!(f, "refreshed ({published} changed)"),
            Self::RefreshFailed => f.write_str("refresh failed"),
            Self::Cooldown => f.write_str("cooldown"),
            Self::Idle => f.write_str("idle"),
        }
    }
}

/// Single owner of the receiver connection.
pub struct Scheduler<T, B> {
    transport: T,
    fetcher: StatusFetcher,
    publisher: ChangePublisher<B>,
    queue: CommandQueue,
    config: SchedulerConfig,
    state: SchedulerState,
    refresh_counter: u32,
    tick_count: u64,
}

impl<T, B> Scheduler<T, B>
where
    T: DeviceTransport,
    B: BusPublisher,
{
    /// Creates a scheduler draining `queue` and refreshing through `fetcher`.
    #[must_use]
    pub fn new(
        transport: T,
        fetcher: StatusFetcher,
        publisher: ChangePublisher<B>,
        queue: CommandQueue,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            transport,
            fetcher,
            publisher,
            queue,
            config,
            state: SchedulerState::Idle,
            refresh_counter: 0,
            tick_count: 0,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Returns the number of idle ticks since the last refresh.
    #[must_use]
    pub fn refresh_counter(&self) -> u32 {
        self.refresh_counter
    }

    /// Returns the number of ticks run so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Returns the timing configuration.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Runs one scheduling step.
    pub async fn tick(&mut self) -> TickOutcome {
        self.tick_count += 1;

        if let SchedulerState::PostPowerOnCooldown { resume_at } = self.state {
            if self.tick_count < resume_at {
                return TickOutcome::Cooldown;
            }
            tracing::debug!("Warm-up finished, resuming dispatch");
            self.state = SchedulerState::Idle;
        }

        if let Some(command) = self.queue.dequeue_one() {
            return self.execute(command).await;
        }

        self.refresh_counter += 1;
        if self.refresh_counter >= self.config.refresh_period {
            return self.refresh().await;
        }

        TickOutcome::Idle
    }

    /// Ticks forever at the configured interval.
    ///
    /// A tick that overruns delays the following ones instead of bunching
    /// them up.
    pub async fn run(&mut self) {
        let mut interval = tokio::time::interval(self.config.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval = ?self.config.tick_interval,
            refresh_period = self.config.refresh_period,
            "Scheduler started"
        );

        loop {
            interval.tick().await;
            let outcome = self.tick().await;
            tracing::trace!(tick = self.tick_count, outcome = %outcome, "Tick");
        }
    }

    async fn execute(&mut self, command: PendingCommand) -> TickOutcome {
        self.state = SchedulerState::ExecutingCommand;
        let attribute = command.attribute();
        let path = command.to_request_path();

        tracing::debug!(command = %path, remaining = self.queue.len(), "Dispatching command");

        let outcome = match self.transport.send_command(&command).await {
            Ok(_) => TickOutcome::Executed(attribute),
            Err(e) => {
                tracing::warn!(command = %path, error = %e, "Command failed");
                TickOutcome::ExecutionFailed(attribute)
            }
        };

        self.state = if command.is_power_on() {
            let resume_at = self.tick_count + u64::from(self.config.power_on_cooldown) + 1;
            tracing::info!(
                ticks = self.config.power_on_cooldown,
                "Receiver powering on, holding commands"
            );
            SchedulerState::PostPowerOnCooldown { resume_at }
        } else {
            SchedulerState::Idle
        };

        outcome
    }

    async fn refresh(&mut self) -> TickOutcome {
        self.state = SchedulerState::Refreshing;

        let outcome = match self.fetcher.fetch(&self.transport).await {
            Ok(snapshot) => {
                let published = self.publisher.publish_changes(&snapshot).await;
                tracing::debug!(changed = published, "Refreshed status");
                TickOutcome::Refreshed { published }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Status refresh failed");
                TickOutcome::RefreshFailed
            }
        };

        self.refresh_counter = 0;
        self.state = SchedulerState::Idle;
        outcome
    }
}

impl<T, B> fmt::Debug for Scheduler<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("state", &self.state)
            .field("refresh_counter", &self.refresh_counter)
            .field("tick_count", &self.tick_count)
            .field("queued", &self.queue.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
