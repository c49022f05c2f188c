// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On/off switches: zone power and mute.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;
use crate::types::Attribute;

/// Power state of the main zone.
///
/// # Examples
///
/// ```
/// use hifi_bridge::types::PowerState;
///
/// let on: PowerState = "on".parse().unwrap();
/// assert_eq!(on, PowerState::On);
/// assert_eq!(on.as_str(), "ON");
/// assert_eq!(PowerState::Off.device_code(), "PowerStandby");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerState {
    /// Standby.
    Off,
    /// Powered on.
    On,
}

impl PowerState {
    /// Returns the bus representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Returns the receiver's command word.
    #[must_use]
    pub const fn device_code(&self) -> &'static str {
        match self {
            Self::Off => "PowerStandby",
            Self::On => "PowerOn",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OFF" => Ok(Self::Off),
            "ON" => Ok(Self::On),
            _ => Err(ValueError::InvalidChoice {
                attribute: Attribute::Power,
                value: s.to_string(),
            }),
        }
    }
}

/// Mute state of the main zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuteState {
    /// Audio is audible.
    Off,
    /// Audio is muted.
    On,
}

impl MuteState {
    /// Returns the bus representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Returns the receiver's command word.
    #[must_use]
    pub const fn device_code(&self) -> &'static str {
        match self {
            Self::Off => "MuteOff",
            Self::On => "MuteOn",
        }
    }
}

impl fmt::Display for MuteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MuteState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OFF" => Ok(Self::Off),
            "ON" => Ok(Self::On),
            _ => Err(ValueError::InvalidChoice {
                attribute: Attribute::Mute,
                value: s.to_string(),
            }),
        }
    }
}
