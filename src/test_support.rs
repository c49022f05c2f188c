// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::command::Command;
use crate::error::ProtocolError;
use crate::protocol::{BusPublisher, DeviceResponse, DeviceTransport};

#[derive(Debug, Default)]
struct TransportLog {
    status_responses: HashMap<String, String>,
    fail_commands: bool,
    status_queries: Vec<String>,
    commands: Vec<String>,
}

/// Receiver double: answers status queries from a table and records every
/// request. Unknown queries fail like an unreachable receiver.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeTransport {
    log: Arc<Mutex<TransportLog>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond_status(&self, query: &str, response: &str) {
        self.log
            .lock()
            .status_responses
            .insert(query.to_string(), response.to_string());
    }

    pub(crate) fn clear_status(&self) {
        self.log.lock().status_responses.clear();
    }

    pub(crate) fn fail_commands(&self, fail: bool) {
        self.log.lock().fail_commands = fail;
    }

    pub(crate) fn status_queries(&self) -> Vec<String> {
        self.log.lock().status_queries.clone()
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.log.lock().commands.clone()
    }
}

impl DeviceTransport for FakeTransport {
    async fn query_status(&self, body: &str) -> Result<DeviceResponse, ProtocolError> {
        let mut log = self.log.lock();
        log.status_queries.push(body.to_string());
        log.status_responses
            .get(body)
            .map(|response| DeviceResponse::new(response.clone()))
            .ok_or_else(|| ProtocolError::ConnectionFailed("receiver unreachable".to_string()))
    }

    async fn send_command<C: Command + Sync>(
        &self,
        command: &C,
    ) -> Result<DeviceResponse, ProtocolError> {
        let mut log = self.log.lock();
        log.commands.push(command.to_request_path());
        if log.fail_commands {
            Err(ProtocolError::Timeout(8000))
        } else {
            Ok(DeviceResponse::new(String::new()))
        }
    }
}

/// Bus double that records published messages.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingBus {
    published: Arc<Mutex<Vec<(String, String)>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    pub(crate) fn published(&self) -> Vec<(String, String)> {
        self.published.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.published.lock().clear();
    }
}

impl BusPublisher for RecordingBus {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), ProtocolError> {
        self.published
            .lock()
            .push((topic.to_string(), payload.to_string()));
        if *self.failing.lock() {
            Err(ProtocolError::Timeout(5000))
        } else {
            Ok(())
        }
    }
}
