// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Volume scaling between bus percentages and the receiver's native steps.
//!
//! The two directions are deliberately separate. Writes take a percentage
//! and produce a zero-padded native step; reads take the native display
//! value and produce a percentage.

use std::fmt;

use crate::error::ValueError;

/// Requested volume as a percentage (1-100).
///
/// Zero and negative inputs are rejected so that a stray `0` on the bus never
/// silences the amplifier through the volume path.
///
/// # Examples
///
/// ```
/// use hifi_bridge::types::VolumePercent;
///
/// let vol = VolumePercent::parse("50").unwrap();
/// assert_eq!(vol.to_native(60), 30);
/// assert_eq!(VolumePercent::parse("5").unwrap().native_code(60), "03");
///
/// assert!(VolumePercent::parse("0").is_err());
/// assert!(VolumePercent::parse("-5").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VolumePercent(u8);

impl VolumePercent {
    /// Smallest accepted percentage.
    pub const MIN: u8 = 1;
    /// Largest accepted percentage.
    pub const MAX: u8 = 100;

    /// Creates a volume percentage.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `value` is outside 1-100.
    pub fn new(value: i64) -> Result<Self, ValueError> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(ValueError::OutOfRange {
                min: i64::from(Self::MIN),
                max: i64::from(Self::MAX),
                actual: value,
            }),
        }
    }

    /// Parses a percentage from a bus payload.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NotAnInteger` for non-numeric input and
    /// `ValueError::OutOfRange` for values outside 1-100.
    pub fn parse(input: &str) -> Result<Self, ValueError> {
        let value: i64 = input
            .trim()
            .parse()
            .map_err(|_| ValueError::NotAnInteger(input.to_string()))?;
        Self::new(value)
    }

    /// Returns the percentage.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Rescales to the receiver's native range `0..=max_volume`, truncating.
    #[must_use]
    pub fn to_native(&self, max_volume: u8) -> u8 {
        // self.0 <= 100, so the result never exceeds max_volume
        let native = u16::from(self.0) * u16::from(max_volume) / 100;
        u8::try_from(native).unwrap_or(max_volume)
    }

    /// Returns the fixed-width native step sent to the receiver.
    #[must_use]
    pub fn native_code(&self, max_volume: u8) -> String {
        format!("{:02}", self.to_native(max_volume))
    }
}

impl fmt::Display for VolumePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Converts a native display value reported by the receiver into a
/// percentage of `max_volume`, truncating toward zero.
///
/// Returns `None` when the value is too large to rescale.
///
/// # Examples
///
/// ```
/// use hifi_bridge::types::percent_from_native;
///
/// assert_eq!(percent_from_native(30, 60), Some(50));
/// assert_eq!(percent_from_native(7, 60), Some(11));
/// assert_eq!(percent_from_native(i64::MAX, 60), None);
/// ```
#[must_use]
pub fn percent_from_native(native: i64, max_volume: u8) -> Option<i64> {
    if max_volume == 0 {
        return Some(0);
    }
    native
        .checked_mul(100)
        .map(|scaled| scaled / i64::from(max_volume))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescales_with_truncation() {
        assert_eq!(VolumePercent::new(50).unwrap().to_native(60), 30);
        assert_eq!(VolumePercent::new(57).unwrap().to_native(60), 34);
        assert_eq!(VolumePercent::new(100).unwrap().to_native(60), 60);
        assert_eq!(VolumePercent::new(1).unwrap().to_native(60), 0);
    }

    #[test]
    fn native_code_is_zero_padded() {
        assert_eq!(VolumePercent::new(5).unwrap().native_code(60), "03");
        assert_eq!(VolumePercent::new(1).unwrap().native_code(60), "00");
        assert_eq!(VolumePercent::new(50).unwrap().native_code(60), "30");
        assert_eq!(VolumePercent::new(100).unwrap().native_code(98), "98");
    }

    #[test]
    fn rejects_zero_and_negative() {
        assert_eq!(
            VolumePercent::parse("0").unwrap_err(),
            ValueError::OutOfRange {
                min: 1,
                max: 100,
                actual: 0
            }
        );
        assert!(VolumePercent::parse("-20").is_err());
    }

    #[test]
    fn rejects_above_hundred() {
        assert!(VolumePercent::parse("101").is_err());
        assert!(VolumePercent::parse("1000").is_err());
    }

    #[test]
    fn rejects_non_numeric() {
        assert_eq!(
            VolumePercent::parse("LOUD").unwrap_err(),
            ValueError::NotAnInteger("LOUD".to_string())
        );
        assert!(VolumePercent::parse("12.5").is_err());
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(VolumePercent::parse(" 42 ").unwrap().value(), 42);
    }

    #[test]
    fn readback_conversion() {
        assert_eq!(percent_from_native(0, 60), Some(0));
        assert_eq!(percent_from_native(60, 60), Some(100));
        assert_eq!(percent_from_native(45, 60), Some(75));
        assert_eq!(percent_from_native(10, 0), Some(0));
    }

    #[test]
    fn readback_of_huge_value_does_not_overflow() {
        assert_eq!(percent_from_native(99_999_999_999_999_999, 60), None);
        assert_eq!(percent_from_native(i64::MIN, 60), None);
        assert_eq!(percent_from_native(92_233_720_368_547_758, 98), Some(94_116_041_192_395_671));
    }
}
