// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Log output for the daemon.
//!
//! Records carry a local `dd/mm/yy HH:MM:SS` timestamp. They are appended to
//! the configured log file without colours, and written to stdout when no
//! file is configured or debug output is on.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, format::Writer, time::FormatTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingSection;

const TIMESTAMP_FORMAT: &str = "%d/%m/%y %H:%M:%S";

/// Failure to set up logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log file could not be opened for appending.
    #[error("failed to open log file {0}: {1}")]
    OpenFile(PathBuf, String),

    /// A global subscriber is already installed.
    #[error("failed to initialize tracing subscriber: {0}")]
    Init(String),
}

/// Local wall-clock timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format(TIMESTAMP_FORMAT))
    }
}

/// Returns the level filter for the given settings.
///
/// Debug output wins over the configured level; an unparsable level falls
/// back to `info`.
#[must_use]
pub fn level_filter(level: &str, debug: bool) -> LevelFilter {
    if debug {
        return LevelFilter::DEBUG;
    }
    level
        .parse::<Level>()
        .map_or(LevelFilter::INFO, LevelFilter::from_level)
}

/// Returns `true` if records should be written to stdout.
#[must_use]
pub fn writes_to_stdout(file: Option<&Path>, debug: bool) -> bool {
    file.is_none() || debug
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LoggingError::OpenFile(path.to_path_buf(), e.to_string()))
}

/// Installs the global subscriber.
///
/// `debug` is the effective debug flag, i.e. the configured one possibly
/// overridden on the command line.
///
/// # Errors
///
/// Returns `LoggingError` if the log file cannot be opened or a subscriber
/// is already installed.
pub fn init_logging(settings: &LoggingSection, debug: bool) -> Result<(), LoggingError> {
    let file_layer = match settings.file.as_deref() {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(
                fmt::layer()
                    .with_timer(LocalTimestamp)
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let stdout_layer = writes_to_stdout(settings.file.as_deref(), debug).then(|| {
        fmt::layer()
            .with_timer(LocalTimestamp)
            .with_target(debug)
            .with_writer(std::io::stdout)
    });

    tracing_subscriber::registry()
        .with(level_filter(&settings.level, debug))
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}
