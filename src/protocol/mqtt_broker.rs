// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT broker connection for the bridge.
//!
//! The broker connection subscribes to every topic below the configured
//! prefix, forwards inbound messages over a channel, and publishes attribute
//! values. The subscription is re-issued on every connection acknowledgment
//! because sessions are clean.
//!
//! # Examples
//!
//! ```no_run
//! use hifi_bridge::protocol::{BusPublisher, MqttBroker};
//!
//! # async fn example() -> hifi_bridge::Result<()> {
//! let (broker, mut inbound) = MqttBroker::builder()
//!     .host("192.168.1.50")
//!     .topic_prefix("/hifi/")
//!     .build()
//!     .await?;
//!
//! broker.publish("/hifi/power", "ON").await?;
//!
//! while let Some(message) = inbound.recv().await {
//!     println!("{} -> {}", message.topic, message.payload);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use tokio::sync::{mpsc, oneshot};

use crate::error::ProtocolError;
use crate::protocol::BusPublisher;

/// Capacity of the channel carrying inbound messages to the router.
const INBOUND_CHANNEL_CAPACITY: usize = 64;

/// A message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Full topic the message was published on.
    pub topic: String,
    /// UTF-8 payload.
    pub payload: String,
}

/// Configuration for an MQTT broker connection.
#[derive(Debug, Clone)]
pub struct MqttBrokerConfig {
    host: String,
    port: u16,
    client_id: Option<String>,
    topic_prefix: String,
    retain: bool,
    keep_alive: Duration,
    connection_timeout: Duration,
    publish_timeout: Duration,
    reconnect_delay: Duration,
}

impl Default for MqttBrokerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 1883,
            client_id: None,
            topic_prefix: "/hifi/".to_string(),
            retain: false,
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            publish_timeout: Duration::from_secs(5),
            reconnect_delay: Duration::from_secs(5),
        }
    }
}

/// A connection to the MQTT broker.
///
/// `MqttBroker` is cheaply cloneable (via `Arc`).
#[derive(Clone)]
pub struct MqttBroker {
    inner: Arc<MqttBrokerInner>,
}

struct MqttBrokerInner {
    /// The MQTT async client for publishing.
    client: AsyncClient,
    /// Configuration used for this connection.
    config: MqttBrokerConfig,
    /// Connection status.
    connected: AtomicBool,
}

impl MqttBroker {
    /// Creates a new builder for configuring an MQTT broker connection.
    #[must_use]
    pub fn builder() -> MqttBrokerBuilder {
        MqttBrokerBuilder::default()
    }

    /// Returns whether the broker is currently connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Returns the host address of the broker.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.inner.config.host
    }

    /// Returns the port of the broker.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.inner.config.port
    }

    /// Returns the topic prefix.
    #[must_use]
    pub fn topic_prefix(&self) -> &str {
        &self.inner.config.topic_prefix
    }

    /// Disconnects from the broker.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect request cannot be queued.
    pub async fn disconnect(&self) -> Result<(), ProtocolError> {
        tracing::info!(
            host = %self.inner.config.host,
            port = %self.inner.config.port,
            "Disconnecting from MQTT broker"
        );

        self.inner
            .client
            .disconnect()
            .await
            .map_err(ProtocolError::Mqtt)?;

        self.inner.connected.store(false, Ordering::Release);
        Ok(())
    }

    /// Queues the wildcard subscription below the topic prefix.
    fn resubscribe(&self) {
        let filter = subscription_filter(&self.inner.config.topic_prefix);
        match self.inner.client.try_subscribe(&filter, QoS::AtMostOnce) {
            Ok(()) => tracing::debug!(filter = %filter, "Subscribing"),
            Err(e) => tracing::warn!(filter = %filter, error = %e, "Failed to subscribe"),
        }
    }
}

impl BusPublisher for MqttBroker {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), ProtocolError> {
        let timeout = self.inner.config.publish_timeout;

        tracing::debug!(topic = %topic, payload = %payload, "Publishing MQTT message");

        // Safe: timeout in practical use will never exceed u64::MAX milliseconds
        #[allow(clippy::cast_possible_truncation)]
        let timeout_ms = timeout.as_millis() as u64;

        tokio::time::timeout(
            timeout,
            self.inner.client.publish(
                topic,
                QoS::AtMostOnce,
                self.inner.config.retain,
                payload.as_bytes().to_vec(),
            ),
        )
        .await
        .map_err(|_| ProtocolError::Timeout(timeout_ms))?
        .map_err(ProtocolError::Mqtt)
    }
}

impl std::fmt::Debug for MqttBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttBroker")
            .field("host", &self.inner.config.host)
            .field("port", &self.inner.config.port)
            .field("topic_prefix", &self.inner.config.topic_prefix)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Returns the wildcard filter covering every topic below `prefix`.
fn subscription_filter(prefix: &str) -> String {
    format!("{prefix}#")
}

/// Builder for creating an MQTT broker connection.
///
/// # Examples
///
/// ```no_run
/// use hifi_bridge::protocol::MqttBroker;
/// use std::time::Duration;
///
/// # async fn example() -> hifi_bridge::Result<()> {
/// let (broker, _inbound) = MqttBroker::builder()
///     .host("192.168.1.50")
///     .port(1883)
///     .client_id("mqtt_hifi")
///     .keep_alive(Duration::from_secs(60))
///     .connection_timeout(Duration::from_secs(5))
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MqttBrokerBuilder {
    config: MqttBrokerConfig,
}

impl MqttBrokerBuilder {
    /// Sets the broker host address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the client ID (default: derived from the process id).
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.config.client_id = Some(id.into());
        self
    }

    /// Sets the topic prefix (default: `/hifi/`).
    #[must_use]
    pub fn topic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.topic_prefix = prefix.into();
        self
    }

    /// Sets whether published values are retained (default: false).
    #[must_use]
    pub fn retain(mut self, retain: bool) -> Self {
        self.config.retain = retain;
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.config.keep_alive = duration;
        self
    }

    /// Sets the initial connection timeout (default: 10 seconds).
    #[must_use]
    pub fn connection_timeout(mut self, duration: Duration) -> Self {
        self.config.connection_timeout = duration;
        self
    }

    /// Sets the publish timeout (default: 5 seconds).
    #[must_use]
    pub fn publish_timeout(mut self, duration: Duration) -> Self {
        self.config.publish_timeout = duration;
        self
    }

    /// Sets the delay before reconnecting after a connection error
    /// (default: 5 seconds).
    #[must_use]
    pub fn reconnect_delay(mut self, duration: Duration) -> Self {
        self.config.reconnect_delay = duration;
        self
    }

    /// Builds and connects to the MQTT broker.
    ///
    /// Returns the broker handle and the receiving end of the inbound message
    /// channel.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Host is not set
    /// - Connection fails
    /// - Connection times out
    pub async fn build(
        self,
    ) -> Result<(MqttBroker, mpsc::Receiver<InboundMessage>), ProtocolError> {
        if self.config.host.is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "MQTT broker host is required".to_string(),
            ));
        }

        let client_id = self
            .config
            .client_id
            .clone()
            .unwrap_or_else(|| format!("hifi_bridge_{}", std::process::id()));

        let mut mqtt_options = MqttOptions::new(&client_id, &self.config.host, self.config.port);
        mqtt_options.set_keep_alive(self.config.keep_alive);
        mqtt_options.set_clean_session(true);

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);

        let inner = MqttBrokerInner {
            client,
            config: self.config.clone(),
            connected: AtomicBool::new(false),
        };

        let broker = MqttBroker {
            inner: Arc::new(inner),
        };

        let (inbound_tx, inbound_rx) = mpsc::channel::<InboundMessage>(INBOUND_CHANNEL_CAPACITY);

        // Channel to signal when ConnAck is received
        let (connack_tx, connack_rx) = oneshot::channel();

        let broker_clone = broker.clone();
        let handle = tokio::spawn(async move {
            handle_broker_events(event_loop, broker_clone, inbound_tx, Some(connack_tx)).await;
        });

        // Wait for ConnAck with timeout
        let timeout = self.config.connection_timeout;
        match tokio::time::timeout(timeout, connack_rx).await {
            Ok(Ok(())) => {
                tracing::info!(
                    host = %self.config.host,
                    port = %self.config.port,
                    client_id = %client_id,
                    "Connected to MQTT broker"
                );
            }
            Ok(Err(_)) => {
                handle.abort();
                return Err(ProtocolError::ConnectionFailed(
                    "MQTT event loop terminated unexpectedly".to_string(),
                ));
            }
            Err(_) => {
                handle.abort();
                return Err(ProtocolError::ConnectionFailed(format!(
                    "MQTT connection timeout after {}s",
                    timeout.as_secs()
                )));
            }
        }

        Ok((broker, inbound_rx))
    }
}

/// Handles MQTT events for the broker connection.
///
/// Runs until the inbound receiver is dropped. Connection errors are logged
/// and polling resumes after the reconnect delay, which makes rumqttc
/// reconnect.
async fn handle_broker_events(
    mut event_loop: EventLoop,
    broker: MqttBroker,
    inbound_tx: mpsc::Sender<InboundMessage>,
    connack_tx: Option<oneshot::Sender<()>>,
) {
    use rumqttc::{Event, Packet};

    let mut connack_tx = connack_tx;

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT broker connected");
                broker.inner.connected.store(true, Ordering::Release);
                broker.resubscribe();
                if let Some(tx) = connack_tx.take() {
                    let _ = tx.send(());
                } else {
                    tracing::info!("Reconnected to MQTT broker");
                }
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let Ok(payload) = String::from_utf8(publish.payload.to_vec()) else {
                    tracing::warn!(topic = %publish.topic, "Ignoring non UTF-8 payload");
                    continue;
                };
                tracing::info!(
                    topic = %publish.topic,
                    payload = %payload,
                    "MQTT message received"
                );
                let message = InboundMessage {
                    topic: publish.topic,
                    payload,
                };
                if inbound_tx.send(message).await.is_err() {
                    tracing::debug!("Inbound receiver dropped, stopping MQTT event loop");
                    break;
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("MQTT broker disconnected");
                broker.inner.connected.store(false, Ordering::Release);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "MQTT connection error, reconnecting");
                broker.inner.connected.store(false, Ordering::Release);
                tokio::time::sleep(broker.inner.config.reconnect_delay).await;
            }
        }
    }
}
