// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The fixed set of receiver attributes exchanged over the bus.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// A named property of the receiver.
///
/// Each attribute maps to one bus topic (`<prefix><name>`). Six of them are
/// read back from the device on every refresh; `favorite` is command-only.
///
/// # Examples
///
/// ```
/// use hifi_bridge::types::Attribute;
///
/// let attr: Attribute = "Volume".parse().unwrap();
/// assert_eq!(attr, Attribute::Volume);
/// assert_eq!(attr.as_str(), "volume");
/// assert!("brightness".parse::<Attribute>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Main zone power.
    Power,
    /// Selected input source.
    Source,
    /// Mute state.
    Mute,
    /// Master volume, as a percentage.
    Volume,
    /// Tuner band.
    Band,
    /// Currently playing track or frequency.
    Playing,
    /// Favorite slot to recall.
    Favorite,
}

impl Attribute {
    /// Number of attributes.
    pub const COUNT: usize = 7;

    /// Every attribute, in topic order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Power,
        Self::Source,
        Self::Mute,
        Self::Volume,
        Self::Band,
        Self::Playing,
        Self::Favorite,
    ];

    /// Attributes reported by a status refresh.
    pub const OBSERVED: [Self; 6] = [
        Self::Power,
        Self::Source,
        Self::Mute,
        Self::Volume,
        Self::Band,
        Self::Playing,
    ];

    /// Returns the topic segment for this attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Source => "source",
            Self::Mute => "mute",
            Self::Volume => "volume",
            Self::Band => "band",
            Self::Playing => "playing",
            Self::Favorite => "favorite",
        }
    }

    /// Returns `true` if a status refresh reports this attribute.
    #[must_use]
    pub const fn is_observed(self) -> bool {
        !matches!(self, Self::Favorite)
    }

    /// Slot of this attribute in fixed-size per-attribute storage.
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|attr| attr.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ValueError::UnknownAttribute(s.to_string()))
    }
}
