// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! Failures fall into three families:
//!
//! - [`ValueError`]: an inbound command value was rejected. Logged and dropped.
//! - [`ProtocolError`] and [`ParseError`]: talking to the device or the broker
//!   failed, or the device answered with something unusable. The affected tick
//!   is abandoned and the scheduler carries on.
//! - [`ConfigError`] and a failed initial broker connection: fatal at startup.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Attribute;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a device response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while validating an inbound command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// A value that should be an integer could not be parsed.
    #[error("not an integer: {0:?}")]
    NotAnInteger(String),

    /// The value is not one of the choices accepted for the attribute.
    #[error("invalid argument {value:?} for {attribute}")]
    InvalidChoice {
        /// The attribute the value was meant for.
        attribute: Attribute,
        /// The rejected value.
        value: String,
    },

    /// The attribute can be observed but not commanded.
    #[error("{0} cannot be commanded")]
    NotControllable(Attribute),

    /// The name does not match any known attribute.
    #[error("unknown attribute: {0:?}")]
    UnknownAttribute(String),
}

/// Errors related to protocol communication (HTTP/MQTT).
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// MQTT connection or communication failed.
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection failed or the peer answered with a non-success status.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to parsing device responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The markup is not well formed.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Expected element is missing from the response.
    #[error("missing element in response: {0}")]
    MissingField(String),

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The element that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {0}: {1}")]
    Read(PathBuf, String),

    /// The file is not valid TOML or does not match the expected layout.
    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, String),

    /// A setting has an unusable value.
    #[error("invalid setting {key}: {message}")]
    Invalid {
        /// Dotted key of the offending setting.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
