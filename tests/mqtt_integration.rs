// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT broker connection using mockforge-mqtt.

use std::time::Duration;

use hifi_bridge::command::{CommandBuilder, CommandQueue, PendingCommand};
use hifi_bridge::error::ProtocolError;
use hifi_bridge::protocol::{BusPublisher, MqttBroker};
use hifi_bridge::router::MessageRouter;
use hifi_bridge::state::StateStore;
use hifi_bridge::status::ChangePublisher;
use hifi_bridge::types::{Attribute, PowerState};
use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use tokio::time::{sleep, timeout};

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18950);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = MqttConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    // Give the broker time to start, bind to port, and be ready to accept connections
    sleep(Duration::from_millis(500)).await;
}

/// Connects a second client that plays the part of a home automation
/// controller sending commands.
async fn connect_controller(port: u16) -> AsyncClient {
    let options = MqttOptions::new("hifi_controller", "127.0.0.1", port);
    let (client, mut event_loop) = AsyncClient::new(options, 10);

    tokio::spawn(async move {
        while event_loop.poll().await.is_ok() {}
    });

    // Let the bridge's wildcard subscription settle before publishing
    sleep(Duration::from_millis(500)).await;
    client
}

// ============================================================================
// Connection
// ============================================================================

mod connection {
    use super::*;

    #[tokio::test]
    async fn connect_to_broker() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let result = MqttBroker::builder()
            .host("127.0.0.1")
            .port(port)
            .client_id("mqtt_hifi_test")
            .build()
            .await;

        assert!(result.is_ok(), "Failed to connect: {:?}", result.err());

        let (broker, _inbound) = result.unwrap();
        assert!(broker.is_connected());
        assert_eq!(broker.port(), port);
        assert_eq!(broker.topic_prefix(), "/hifi/");
    }

    #[tokio::test]
    async fn missing_host_fails() {
        let result = MqttBroker::builder().port(1883).build().await;

        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn unreachable_broker_fails_within_timeout() {
        // Nothing listens on this port.
        let port = get_test_port();

        let result = MqttBroker::builder()
            .host("127.0.0.1")
            .port(port)
            .connection_timeout(Duration::from_millis(500))
            .reconnect_delay(Duration::from_millis(100))
            .build()
            .await;

        assert!(matches!(result, Err(ProtocolError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn disconnect_clears_connected_flag() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (broker, _inbound) = MqttBroker::builder()
            .host("127.0.0.1")
            .port(port)
            .build()
            .await
            .unwrap();

        broker.disconnect().await.unwrap();
        assert!(!broker.is_connected());
    }
}

// ============================================================================
// Publishing
// ============================================================================

mod publishing {
    use super::*;

    #[tokio::test]
    async fn publish_attribute_value() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (broker, _inbound) = MqttBroker::builder()
            .host("127.0.0.1")
            .port(port)
            .topic_prefix("/test/hifi/")
            .build()
            .await
            .unwrap();

        let publisher = ChangePublisher::new(broker.clone(), StateStore::new(), broker.topic_prefix());
        let topic = publisher.topic_for(Attribute::Volume);
        assert_eq!(topic, "/test/hifi/volume");

        let result = broker.publish(&topic, "50").await;
        assert!(result.is_ok(), "Failed to publish: {:?}", result.err());
    }

    #[tokio::test]
    async fn publish_retained_value() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (broker, _inbound) = MqttBroker::builder()
            .host("127.0.0.1")
            .port(port)
            .retain(true)
            .build()
            .await
            .unwrap();

        let result = broker.publish("/hifi/power", "ON").await;
        assert!(result.is_ok());
    }
}

// ============================================================================
// Inbound
// ============================================================================

mod inbound {
    use super::*;

    #[tokio::test]
    async fn message_below_prefix_is_delivered() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (_broker, mut inbound) = MqttBroker::builder()
            .host("127.0.0.1")
            .port(port)
            .client_id("hifi_bridge_inbound")
            .build()
            .await
            .unwrap();

        let controller = connect_controller(port).await;
        controller
            .publish("/hifi/power", QoS::AtMostOnce, false, "ON")
            .await
            .unwrap();

        let message = timeout(Duration::from_secs(5), inbound.recv())
            .await
            .expect("no inbound message within 5s")
            .expect("inbound channel closed");

        assert_eq!(message.topic, "/hifi/power");
        assert_eq!(message.payload, "ON");
    }

    #[tokio::test]
    async fn message_outside_prefix_is_not_delivered() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (_broker, mut inbound) = MqttBroker::builder()
            .host("127.0.0.1")
            .port(port)
            .client_id("hifi_bridge_filtered")
            .build()
            .await
            .unwrap();

        let controller = connect_controller(port).await;
        controller
            .publish("/other/power", QoS::AtMostOnce, false, "ON")
            .await
            .unwrap();
        controller
            .publish("/hifi/mute", QoS::AtMostOnce, false, "on")
            .await
            .unwrap();

        let message = timeout(Duration::from_secs(5), inbound.recv())
            .await
            .expect("no inbound message within 5s")
            .expect("inbound channel closed");

        assert_eq!(message.topic, "/hifi/mute");
    }

    #[tokio::test]
    async fn routed_message_is_queued() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (_broker, inbound) = MqttBroker::builder()
            .host("127.0.0.1")
            .port(port)
            .client_id("hifi_bridge_routed")
            .build()
            .await
            .unwrap();

        let store = StateStore::new();
        let queue = CommandQueue::new();
        let router = MessageRouter::new("/hifi/", store.clone(), queue.clone(), CommandBuilder::new(60));
        tokio::spawn(router.run(inbound));

        let controller = connect_controller(port).await;
        controller
            .publish("/hifi/power", QoS::AtMostOnce, false, "on")
            .await
            .unwrap();

        let command = timeout(Duration::from_secs(5), async {
            loop {
                if let Some(command) = queue.dequeue_one() {
                    return command;
                }
                sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("no command queued within 5s");

        assert_eq!(command, PendingCommand::Power(PowerState::On));
        assert_eq!(store.get(Attribute::Power), "ON");
    }
}
