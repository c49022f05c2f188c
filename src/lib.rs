// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `hifi_bridge` - Bridge an MQTT bus to a network hi-fi receiver.
//!
//! The receiver is controlled over its HTTP `goform` interface. The bridge
//! exposes seven attributes on the bus, one topic each below a common
//! prefix:
//!
//! | Attribute | Direction | Values |
//! |-----------|-----------|--------|
//! | `power` | read/write | ON, OFF |
//! | `source` | read/write | TUNER, IRADIO (reads report the receiver's label) |
//! | `mute` | read/write | ON, OFF |
//! | `volume` | read/write | 1-100 (%) |
//! | `band` | read/write | DA, FM |
//! | `playing` | read | frequency or track title |
//! | `favorite` | write | favorite slot |
//!
//! # Architecture
//!
//! - The [`router::MessageRouter`] validates inbound messages into commands
//!   and appends them to the [`command::CommandQueue`].
//! - The [`scheduler::Scheduler`] owns the receiver. Once per tick it sends
//!   one queued command or, when idle long enough, refreshes the status and
//!   publishes what changed.
//! - The [`state::StateStore`] holds the last-known value of every attribute
//!   and is shared by both.
//!
//! # Quick Start
//!
//! ```no_run
//! use hifi_bridge::command::{CommandBuilder, CommandQueue};
//! use hifi_bridge::protocol::{HttpConfig, MqttBroker};
//! use hifi_bridge::router::MessageRouter;
//! use hifi_bridge::scheduler::{Scheduler, SchedulerConfig};
//! use hifi_bridge::state::StateStore;
//! use hifi_bridge::status::{ChangePublisher, StatusFetcher};
//!
//! #[tokio::main]
//! async fn main() -> hifi_bridge::Result<()> {
//!     let transport = HttpConfig::new("192.168.1.20").into_client()?;
//!     let (broker, inbound) = MqttBroker::builder()
//!         .host("192.168.1.50")
//!         .topic_prefix("/hifi/")
//!         .build()
//!         .await?;
//!
//!     let store = StateStore::new();
//!     let queue = CommandQueue::new();
//!
//!     let router = MessageRouter::new("/hifi/", store.clone(), queue.clone(), CommandBuilder::new(60));
//!     tokio::spawn(router.run(inbound));
//!
//!     let publisher = ChangePublisher::new(broker, store, "/hifi/");
//!     let mut scheduler = Scheduler::new(
//!         transport,
//!         StatusFetcher::new(60),
//!         publisher,
//!         queue,
//!         SchedulerConfig::default(),
//!     );
//!     scheduler.run().await;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod router;
pub mod scheduler;
pub mod state;
pub mod status;
#[cfg(test)]
mod test_support;
pub mod types;

pub use command::{Command, CommandBuilder, CommandQueue, PendingCommand};
pub use config::BridgeConfig;
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result, ValueError};
pub use protocol::{BusPublisher, DeviceTransport, HttpClient, HttpConfig, MqttBroker};
pub use router::{MessageRouter, RouteOutcome};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerState, TickOutcome};
pub use state::{StateChange, StateStore};
pub use status::{ChangePublisher, StatusFetcher, StatusSnapshot};
pub use types::{Attribute, Band, MuteState, PowerState, Source, VolumePercent};
