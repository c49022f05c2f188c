// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Receiver command definitions.
//!
//! Commands are validated once, by the [`CommandBuilder`], and then travel
//! through the [`CommandQueue`] as [`PendingCommand`] values until the
//! scheduler sends them.
//!
//! # Available Commands
//!
//! | Attribute | Accepted values | Request |
//! |-----------|-----------------|---------|
//! | power | ON, OFF | `formiPhoneAppPower.xml?1+PowerOn` |
//! | mute | ON, OFF | `formiPhoneAppMute.xml?1+MuteOn` |
//! | band | DA, FM | `formiPhoneAppTuner.xml?1+FM` |
//! | source | TUNER, IRADIO | `formiPhoneAppDirect.xml?SITUNER` |
//! | volume | 1-100 (%) | `formiPhoneAppDirect.xml?MV30` |
//! | favorite | any slot id | `formiPhoneAppFavorite_Call.xml?1` |
//!
//! # Examples
//!
//! ```
//! use hifi_bridge::command::{Command, CommandBuilder};
//! use hifi_bridge::types::Attribute;
//!
//! let builder = CommandBuilder::new(60);
//! let cmd = builder.build(Attribute::Volume, "50").unwrap();
//!
//! assert_eq!(cmd.endpoint(), "formiPhoneAppDirect.xml");
//! assert_eq!(cmd.to_request_path(), "formiPhoneAppDirect.xml?MV30");
//! ```

mod builder;
mod queue;

pub use builder::CommandBuilder;
pub use queue::CommandQueue;

use crate::state::StateChange;
use crate::types::{Attribute, Band, MuteState, PowerState, Source, VolumePercent};

/// A command that can be sent to the receiver.
///
/// Commands are plain GET requests below the receiver's `goform/` directory,
/// with the argument carried verbatim in the query string.
pub trait Command {
    /// Returns the form the request is sent to.
    fn endpoint(&self) -> &'static str;

    /// Returns the query string, without the leading `?`.
    fn query(&self) -> String;

    /// Returns the request path relative to `goform/`.
    fn to_request_path(&self) -> String {
        format!("{}?{}", self.endpoint(), self.query())
    }
}

/// A validated command waiting for its turn on the receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingCommand {
    /// Switch the main zone on or to standby.
    Power(PowerState),
    /// Mute or unmute.
    Mute(MuteState),
    /// Select the tuner band.
    Band(Band),
    /// Select the input source.
    Source(Source),
    /// Set the master volume.
    Volume {
        /// The requested percentage.
        percent: VolumePercent,
        /// Fixed-width native step derived from the percentage.
        native: String,
    },
    /// Recall a favorite slot.
    Favorite(String),
}

impl PendingCommand {
    /// Returns the attribute this command acts on.
    #[must_use]
    pub fn attribute(&self) -> Attribute {
        match self {
            Self::Power(_) => Attribute::Power,
            Self::Mute(_) => Attribute::Mute,
            Self::Band(_) => Attribute::Band,
            Self::Source(_) => Attribute::Source,
            Self::Volume { .. } => Attribute::Volume,
            Self::Favorite(_) => Attribute::Favorite,
        }
    }

    /// Returns `true` for the command that wakes the receiver from standby.
    #[must_use]
    pub fn is_power_on(&self) -> bool {
        matches!(self, Self::Power(PowerState::On))
    }

    /// Returns the state the receiver will be in once this command lands.
    ///
    /// Volume and favorites are left to the next status refresh: the volume
    /// read back is a rescaled native value and a favorite is an action, not
    /// a state.
    #[must_use]
    pub fn state_change(&self) -> Option<StateChange> {
        match self {
            Self::Power(state) => Some(StateChange::power(*state)),
            Self::Mute(state) => Some(StateChange::mute(*state)),
            Self::Band(band) => Some(StateChange::band(*band)),
            Self::Source(source) => Some(StateChange::source(*source)),
            Self::Volume { .. } | Self::Favorite(_) => None,
        }
    }
}

impl Command for PendingCommand {
    fn endpoint(&self) -> &'static str {
        match self {
            Self::Power(_) => "formiPhoneAppPower.xml",
            Self::Mute(_) => "formiPhoneAppMute.xml",
            Self::Band(_) => "formiPhoneAppTuner.xml",
            Self::Source(_) | Self::Volume { .. } => "formiPhoneAppDirect.xml",
            Self::Favorite(_) => "formiPhoneAppFavorite_Call.xml",
        }
    }

    fn query(&self) -> String {
        match self {
            Self::Power(state) => format!("1+{}", state.device_code()),
            Self::Mute(state) => format!("1+{}", state.device_code()),
            Self::Band(band) => format!("1+{band}"),
            Self::Source(source) => format!("SI{source}"),
            Self::Volume { native, .. } => format!("MV{native}"),
            Self::Favorite(slot) => urlencoding::encode(slot).into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_request_paths() {
        assert_eq!(
            PendingCommand::Power(PowerState::On).to_request_path(),
            "formiPhoneAppPower.xml?1+PowerOn"
        );
        assert_eq!(
            PendingCommand::Power(PowerState::Off).to_request_path(),
            "formiPhoneAppPower.xml?1+PowerStandby"
        );
    }

    #[test]
    fn mute_band_source_request_paths() {
        assert_eq!(
            PendingCommand::Mute(MuteState::Off).to_request_path(),
            "formiPhoneAppMute.xml?1+MuteOff"
        );
        assert_eq!(
            PendingCommand::Band(Band::Dab).to_request_path(),
            "formiPhoneAppTuner.xml?1+DA"
        );
        assert_eq!(
            PendingCommand::Source(Source::InternetRadio).to_request_path(),
            "formiPhoneAppDirect.xml?SIIRADIO"
        );
    }

    #[test]
    fn favorite_slot_is_encoded() {
        assert_eq!(
            PendingCommand::Favorite("3".to_string()).to_request_path(),
            "formiPhoneAppFavorite_Call.xml?3"
        );
        assert_eq!(
            PendingCommand::Favorite("A B".to_string()).query(),
            "A%20B"
        );
    }

    #[test]
    fn only_power_on_triggers_warm_up() {
        assert!(PendingCommand::Power(PowerState::On).is_power_on());
        assert!(!PendingCommand::Power(PowerState::Off).is_power_on());
        assert!(!PendingCommand::Mute(MuteState::On).is_power_on());
    }

    #[test]
    fn optimistic_state_changes() {
        assert_eq!(
            PendingCommand::Source(Source::Tuner).state_change(),
            Some(StateChange::source(Source::Tuner))
        );
        assert_eq!(
            PendingCommand::Favorite("1".to_string()).state_change(),
            None
        );
        let volume = PendingCommand::Volume {
            percent: VolumePercent::new(50).unwrap(),
            native: "30".to_string(),
        };
        assert_eq!(volume.state_change(), None);
        assert_eq!(volume.attribute(), Attribute::Volume);
    }
}
