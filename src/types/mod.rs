// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for receiver control.
//!
//! Each type only admits values the receiver accepts, so a command that
//! reaches the queue has already been validated.
//!
//! # Types
//!
//! - [`Attribute`] - The seven bus-facing receiver properties
//! - [`PowerState`] - Zone power (ON/OFF)
//! - [`MuteState`] - Mute (ON/OFF)
//! - [`Source`] - Selectable input (TUNER/IRADIO)
//! - [`Band`] - Tuner band (DA/FM)
//! - [`VolumePercent`] - Requested volume (1-100%)

mod attribute;
mod input;
mod power;
mod volume;

pub use attribute::Attribute;
pub use input::{Band, Source};
pub use power::{MuteState, PowerState};
pub use volume::{VolumePercent, percent_from_native};
