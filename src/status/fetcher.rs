// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status queries and their mapping onto attributes.

use crate::error::{Error, ParseError};
use crate::protocol::DeviceTransport;
use crate::types::{Attribute, percent_from_native};

use super::XmlDocument;

/// Base query: zone power, volume, mute and source.
pub const BASE_STATUS_QUERY: &str = concat!(
    r#"<?xml version="1.0" encoding="utf-8" ?><tx>"#,
    r#"<cmd id="1">GetAllZonePowerStatus</cmd>"#,
    r#"<cmd id="1">GetVolumeLevel</cmd>"#,
    r#"<cmd id="1">GetMuteStatus</cmd>"#,
    r#"<cmd id="1">GetSourceStatus</cmd>"#,
    "</tx>"
);

/// Tuner follow-up query: band and frequency.
pub const TUNER_STATUS_QUERY: &str =
    r#"<?xml version="1.0" encoding="utf-8" ?><tx><cmd id="1">GetTunerStatus</cmd></tx>"#;

/// Network radio follow-up query: track information.
pub const NET_AUDIO_STATUS_QUERY: &str =
    r#"<?xml version="1.0" encoding="utf-8" ?><tx><cmd id="1">GetNetAudioStatus</cmd></tx>"#;

/// Values of the observed attributes as reported by one refresh.
///
/// Fields the receiver did not report are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    power: String,
    source: String,
    mute: String,
    volume: String,
    band: String,
    playing: String,
}

impl StatusSnapshot {
    /// Creates a snapshot with every attribute empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the reported value of an attribute.
    ///
    /// Attributes that are never reported read as empty.
    #[must_use]
    pub fn get(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::Power => &self.power,
            Attribute::Source => &self.source,
            Attribute::Mute => &self.mute,
            Attribute::Volume => &self.volume,
            Attribute::Band => &self.band,
            Attribute::Playing => &self.playing,
            Attribute::Favorite => "",
        }
    }

    /// Sets the value of an observed attribute.
    ///
    /// Values for attributes that are never reported are ignored.
    pub fn set(&mut self, attribute: Attribute, value: impl Into<String>) {
        let slot = match attribute {
            Attribute::Power => &mut self.power,
            Attribute::Source => &mut self.source,
            Attribute::Mute => &mut self.mute,
            Attribute::Volume => &mut self.volume,
            Attribute::Band => &mut self.band,
            Attribute::Playing => &mut self.playing,
            Attribute::Favorite => return,
        };
        *slot = value.into();
    }

    /// Sets a value, builder style.
    #[must_use]
    pub fn with(mut self, attribute: Attribute, value: impl Into<String>) -> Self {
        self.set(attribute, value);
        self
    }

    /// Iterates over the observed attributes and their values.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &str)> {
        Attribute::OBSERVED
            .into_iter()
            .map(move |attr| (attr, self.get(attr)))
    }
}

/// Which follow-up query the reported source calls for.
///
/// The receiver only reveals band, frequency or track through a
/// source-specific query whose answer has its own layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceQuery {
    /// Tuner: band and frequency.
    Tuner,
    /// Network radio: track title.
    NetworkRadio,
    /// Any other source: nothing more to ask.
    None,
}

impl SourceQuery {
    /// Source label the receiver reports for the tuner.
    pub const TUNER_SOURCE: &'static str = "TUNER";
    /// Source label the receiver reports for network radio.
    pub const NETWORK_RADIO_SOURCE: &'static str = "Internet Radio";

    /// Selects the follow-up for a reported source.
    #[must_use]
    pub fn for_source(source: &str) -> Self {
        match source {
            Self::TUNER_SOURCE => Self::Tuner,
            Self::NETWORK_RADIO_SOURCE => Self::NetworkRadio,
            _ => Self::None,
        }
    }

    /// Returns the query document to send, if any.
    #[must_use]
    pub fn request_body(&self) -> Option<&'static str> {
        match self {
            Self::Tuner => Some(TUNER_STATUS_QUERY),
            Self::NetworkRadio => Some(NET_AUDIO_STATUS_QUERY),
            Self::None => None,
        }
    }

    /// Copies the follow-up answer into the snapshot.
    pub fn apply(&self, doc: &XmlDocument, snapshot: &mut StatusSnapshot) {
        match self {
            Self::Tuner => {
                snapshot.set(Attribute::Band, doc.text("band").unwrap_or_default());
                snapshot.set(Attribute::Playing, doc.text("frequency").unwrap_or_default());
            }
            Self::NetworkRadio => {
                if let Some(track) = doc.text_by_id("track") {
                    snapshot.set(Attribute::Playing, track);
                }
            }
            Self::None => {}
        }
    }
}

/// Reads the receiver's status.
///
/// A refresh is a base query followed, depending on the reported source, by
/// one [`SourceQuery`]. Both must succeed for the refresh to count.
///
/// # Examples
///
/// ```
/// use hifi_bridge::status::StatusFetcher;
/// use hifi_bridge::types::Attribute;
///
/// let fetcher = StatusFetcher::new(60);
/// let snapshot = fetcher
///     .parse_base(
///         "<rx><zone1>STANDBY</zone1><dispvalue>30</dispvalue>\
///          <mute>off</mute><source>CD</source></rx>",
///     )
///     .unwrap();
///
/// assert_eq!(snapshot.get(Attribute::Power), "OFF");
/// assert_eq!(snapshot.get(Attribute::Volume), "50");
/// assert_eq!(snapshot.get(Attribute::Mute), "OFF");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFetcher {
    max_volume: u8,
}

impl StatusFetcher {
    /// Creates a fetcher for a receiver whose volume runs `0..=max_volume`.
    #[must_use]
    pub fn new(max_volume: u8) -> Self {
        Self { max_volume }
    }

    /// Queries the receiver and returns the observed attribute values.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if a query fails and `Error::Parse` if the
    /// base answer is malformed or lacks a required element.
    pub async fn fetch<T: DeviceTransport>(&self, transport: &T) -> Result<StatusSnapshot, Error> {
        let response = transport.query_status(BASE_STATUS_QUERY).await?;
        let mut snapshot = self.parse_base(response.body())?;

        let follow_up = SourceQuery::for_source(snapshot.get(Attribute::Source));
        if let Some(body) = follow_up.request_body() {
            let response = transport.query_status(body).await?;
            let doc = XmlDocument::parse(response.body())?;
            follow_up.apply(&doc, &mut snapshot);
        }

        Ok(snapshot)
    }

    /// Maps the answer to the base query onto a snapshot.
    ///
    /// `zone1`, `mute` and `dispvalue` are required; `source` is optional.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` for malformed markup, a missing required element
    /// or a volume that is not a usable integer.
    pub fn parse_base(&self, xml: &str) -> Result<StatusSnapshot, ParseError> {
        let doc = XmlDocument::parse(xml)?;

        let zone = required(&doc, "zone1")?;
        let power = if zone.trim() == "STANDBY" { "OFF" } else { "ON" };

        let mute = required(&doc, "mute")?.trim().to_uppercase();

        let display = required(&doc, "dispvalue")?;
        let native: i64 = display
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidValue {
                field: "dispvalue".to_string(),
                message: format!("{display:?} is not an integer"),
            })?;
        let volume = percent_from_native(native, self.max_volume).ok_or_else(|| {
            ParseError::InvalidValue {
                field: "dispvalue".to_string(),
                message: format!("{native} is out of range"),
            }
        })?;

        Ok(StatusSnapshot::new()
            .with(Attribute::Power, power)
            .with(Attribute::Source, doc.text("source").unwrap_or_default())
            .with(Attribute::Mute, mute)
            .with(Attribute::Volume, volume.to_string()))
    }
}

fn required<'a>(doc: &'a XmlDocument, name: &str) -> Result<&'a str, ParseError> {
    doc.text(name)
        .ok_or_else(|| ParseError::MissingField(name.to_string()))
}
