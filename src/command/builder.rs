// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Validation of inbound attribute/value pairs.

use crate::error::ValueError;
use crate::types::{Attribute, Band, MuteState, PowerState, Source, VolumePercent};

use super::PendingCommand;

/// Turns an attribute and a desired value into a [`PendingCommand`].
///
/// # Examples
///
/// ```
/// use hifi_bridge::command::{CommandBuilder, PendingCommand};
/// use hifi_bridge::types::{Attribute, PowerState};
///
/// let builder = CommandBuilder::new(60);
///
/// let cmd = builder.build(Attribute::Power, "ON").unwrap();
/// assert_eq!(cmd, PendingCommand::Power(PowerState::On));
///
/// assert!(builder.build(Attribute::Band, "AM").is_err());
/// assert!(builder.build(Attribute::Playing, "ON").is_err());
/// assert!(builder.build(Attribute::Volume, "0").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandBuilder {
    max_volume: u8,
}

impl CommandBuilder {
    /// Default top of the receiver's native volume range.
    pub const DEFAULT_MAX_VOLUME: u8 = 60;

    /// Creates a builder for a receiver whose volume runs `0..=max_volume`.
    #[must_use]
    pub fn new(max_volume: u8) -> Self {
        Self { max_volume }
    }

    /// Returns the configured native volume ceiling.
    #[must_use]
    pub fn max_volume(&self) -> u8 {
        self.max_volume
    }

    /// Validates a desired value for an attribute.
    ///
    /// # Errors
    ///
    /// Returns a `ValueError` when the value is not accepted for the
    /// attribute, or when the attribute is read-only.
    pub fn build(&self, attribute: Attribute, value: &str) -> Result<PendingCommand, ValueError> {
        let command = match attribute {
            Attribute::Power => PendingCommand::Power(value.parse::<PowerState>()?),
            Attribute::Mute => PendingCommand::Mute(value.parse::<MuteState>()?),
            Attribute::Band => PendingCommand::Band(value.parse::<Band>()?),
            Attribute::Source => PendingCommand::Source(value.parse::<Source>()?),
            Attribute::Volume => {
                let percent = VolumePercent::parse(value)?;
                PendingCommand::Volume {
                    percent,
                    native: percent.native_code(self.max_volume),
                }
            }
            Attribute::Favorite => PendingCommand::Favorite(value.to_string()),
            Attribute::Playing => return Err(ValueError::NotControllable(attribute)),
        };
        Ok(command)
    }
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_VOLUME)
    }
}
