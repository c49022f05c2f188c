// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `hifi-bridge` daemon: connects the MQTT bus to the receiver and runs the
//! scheduler until killed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use hifi_bridge::command::{CommandBuilder, CommandQueue};
use hifi_bridge::config::BridgeConfig;
use hifi_bridge::logging::init_logging;
use hifi_bridge::router::MessageRouter;
use hifi_bridge::scheduler::Scheduler;
use hifi_bridge::state::StateStore;
use hifi_bridge::status::{ChangePublisher, StatusFetcher};

const PKG_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " - MQTT bridge for network receivers");

#[derive(Debug, Parser)]
#[command(version = env!("CARGO_PKG_VERSION"), about = PKG_DESCRIPTION)]
struct Cli {
    /// Path to configuration file
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print the effective configuration and exit
    #[arg(long = "print-config")]
    print_config: bool,
    /// Log at debug level and mirror logs to stdout
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, config_path) = match BridgeConfig::load(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.print_config {
        return match config.to_toml() {
            Ok(rendered) => {
                print!("{rendered}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    let debug = cli.debug || config.logging.debug;
    if let Err(e) = init_logging(&config.logging, debug) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match config_path {
        Some(path) => tracing::info!(path = %path.display(), "Loaded configuration"),
        None => tracing::info!("No configuration file found, using defaults"),
    }

    let transport = match config.device.http_config().into_client() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Invalid receiver address");
            return ExitCode::FAILURE;
        }
    };

    let (broker, inbound) = match config.mqtt.broker_builder().build().await {
        Ok(connected) => connected,
        Err(e) => {
            tracing::error!(
                host = %config.mqtt.host,
                port = config.mqtt.port,
                error = %e,
                "Couldn't connect to MQTT server"
            );
            return ExitCode::FAILURE;
        }
    };

    let store = StateStore::new();
    let queue = CommandQueue::new();

    let router = MessageRouter::new(
        &config.mqtt.topic_prefix,
        store.clone(),
        queue.clone(),
        CommandBuilder::new(config.device.max_volume),
    );
    tokio::spawn(router.run(inbound));

    tracing::info!(
        device = %transport.base_url(),
        prefix = %config.mqtt.topic_prefix,
        "Bridge running"
    );

    let publisher = ChangePublisher::new(broker, store, &config.mqtt.topic_prefix);
    let mut scheduler = Scheduler::new(
        transport,
        StatusFetcher::new(config.device.max_volume),
        publisher,
        queue,
        config.scheduler.scheduler_config(),
    );
    scheduler.run().await;

    ExitCode::SUCCESS
}
