// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol implementations for the two collaborators of the bridge.
//!
//! # Collaborators
//!
//! - [`DeviceTransport`]: request/response access to the receiver. Status
//!   queries are XML documents POSTed to `AppCommand.xml`; commands are GET
//!   requests. Implemented over HTTP by [`HttpClient`].
//! - [`BusPublisher`]: publishing attribute values on the message bus.
//!   Implemented over MQTT by [`MqttBroker`], which also delivers inbound
//!   messages as [`InboundMessage`] values.
//!
//! Every call is bounded by a timeout so a hung receiver or broker costs one
//! tick, not the scheduler.

mod http;
mod mqtt_broker;

pub use http::{HttpClient, HttpConfig};
pub use mqtt_broker::{InboundMessage, MqttBroker, MqttBrokerBuilder, MqttBrokerConfig};

use crate::command::Command;
use crate::error::ProtocolError;

/// Response body returned by the receiver.
#[derive(Debug, Clone)]
pub struct DeviceResponse {
    body: String,
}

impl DeviceResponse {
    /// Creates a response with the given body.
    #[must_use]
    pub fn new(body: String) -> Self {
        Self { body }
    }

    /// Returns the raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Request/response access to the receiver.
///
/// Implementations must bound every call with a timeout and report
/// non-success answers as errors.
#[allow(async_fn_in_trait)]
pub trait DeviceTransport {
    /// Sends a read-only status query and returns the markup response.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails, times out or is
    /// answered with a non-success status.
    async fn query_status(&self, body: &str) -> Result<DeviceResponse, ProtocolError>;

    /// Sends a state-changing command.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails, times out or is
    /// answered with a non-success status.
    async fn send_command<C: Command + Sync>(
        &self,
        command: &C,
    ) -> Result<DeviceResponse, ProtocolError>;
}

/// Publishing side of the message bus.
#[allow(async_fn_in_trait)]
pub trait BusPublisher {
    /// Publishes a single message.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the message cannot be handed to the bus
    /// within the publish timeout.
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), ProtocolError>;
}
