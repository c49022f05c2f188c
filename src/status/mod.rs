// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status refresh: querying the receiver and publishing what changed.
//!
//! A refresh runs in two steps. The [`StatusFetcher`] asks the receiver for
//! power, volume, mute and source, then follows up with a source-specific
//! query for band and now-playing text. The [`ChangePublisher`] commits the
//! resulting [`StatusSnapshot`] to the state store and publishes every
//! attribute whose value differs from what was stored.
//!
//! # Examples
//!
//! ```
//! use hifi_bridge::status::{SourceQuery, StatusFetcher};
//! use hifi_bridge::types::Attribute;
//!
//! let fetcher = StatusFetcher::new(60);
//! let snapshot = fetcher
//!     .parse_base(
//!         "<rx><zone1>ON</zone1><dispvalue>30</dispvalue>\
//!          <mute>on</mute><source>TUNER</source></rx>",
//!     )
//!     .unwrap();
//!
//! assert_eq!(snapshot.get(Attribute::Power), "ON");
//! assert_eq!(
//!     SourceQuery::for_source(snapshot.get(Attribute::Source)),
//!     SourceQuery::Tuner
//! );
//! ```

mod fetcher;
mod publisher;
mod xml;

pub use fetcher::{
    BASE_STATUS_QUERY, NET_AUDIO_STATUS_QUERY, SourceQuery, StatusFetcher, StatusSnapshot,
    TUNER_STATUS_QUERY,
};
pub use publisher::ChangePublisher;
pub use xml::XmlDocument;
