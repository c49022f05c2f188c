// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Input selection: source and tuner band.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;
use crate::types::Attribute;

/// Selectable input source.
///
/// Only the two inputs the bridge knows how to follow up on can be selected.
/// The receiver reports them back under its own names (`TUNER` and
/// `Internet Radio`).
///
/// # Examples
///
/// ```
/// use hifi_bridge::types::Source;
///
/// let src: Source = "iradio".parse().unwrap();
/// assert_eq!(src, Source::InternetRadio);
/// assert_eq!(src.as_str(), "IRADIO");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// FM/DAB tuner.
    Tuner,
    /// Network radio.
    InternetRadio,
}

impl Source {
    /// Returns the bus and command representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tuner => "TUNER",
            Self::InternetRadio => "IRADIO",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TUNER" => Ok(Self::Tuner),
            "IRADIO" => Ok(Self::InternetRadio),
            _ => Err(ValueError::InvalidChoice {
                attribute: Attribute::Source,
                value: s.to_string(),
            }),
        }
    }
}

/// Tuner band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// Digital audio broadcasting.
    Dab,
    /// FM broadcasting.
    Fm,
}

impl Band {
    /// Returns the bus and command representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dab => "DA",
            Self::Fm => "FM",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Band {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DA" => Ok(Self::Dab),
            "FM" => Ok(Self::Fm),
            _ => Err(ValueError::InvalidChoice {
                attribute: Attribute::Band,
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_from_str() {
        assert_eq!("TUNER".parse::<Source>().unwrap(), Source::Tuner);
        assert_eq!("IRADIO".parse::<Source>().unwrap(), Source::InternetRadio);
        assert!("CD".parse::<Source>().is_err());
        // The receiver's own label is not a selectable value.
        assert!("Internet Radio".parse::<Source>().is_err());
    }

    #[test]
    fn band_from_str() {
        assert_eq!("da".parse::<Band>().unwrap(), Band::Dab);
        assert_eq!("FM".parse::<Band>().unwrap(), Band::Fm);
        let err = "AM".parse::<Band>().unwrap_err();
        assert_eq!(
            err,
            ValueError::InvalidChoice {
                attribute: Attribute::Band,
                value: "AM".to_string()
            }
        );
    }
}
