// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat view of the receiver's XML responses.
//!
//! The receiver wraps each answer in a variable number of `<cmd>` blocks
//! whose nesting differs per firmware, so lookups search the whole document
//! by element name or by `id` attribute instead of following a fixed path.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::ParseError;

/// A parsed XML document, flattened into its elements in document order.
///
/// # Examples
///
/// ```
/// use hifi_bridge::status::XmlDocument;
///
/// let doc = XmlDocument::parse(
///     r#"<rx><cmd><zone1>ON</zone1></cmd><cmd><value id="track">Jazz</value></cmd></rx>"#,
/// ).unwrap();
///
/// assert_eq!(doc.text("zone1"), Some("ON"));
/// assert_eq!(doc.text_by_id("track"), Some("Jazz"));
/// assert_eq!(doc.text("band"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct XmlDocument {
    elements: Vec<XmlElement>,
}

#[derive(Debug, Clone)]
struct XmlElement {
    name: String,
    id: Option<String>,
    text: String,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, ParseError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut id = None;
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            if attr.key.as_ref() == b"id" {
                id = Some(attr.unescape_value()?.into_owned());
            }
        }
        Ok(Self {
            name,
            id,
            text: String::new(),
        })
    }
}

impl XmlDocument {
    /// Parses a document.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Xml` for malformed markup and
    /// `ParseError::UnexpectedFormat` if the document ends inside an element.
    pub fn parse(xml: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut elements: Vec<XmlElement> = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    open.push(elements.len());
                    elements.push(XmlElement::from_start(&start)?);
                }
                Event::Empty(start) => elements.push(XmlElement::from_start(&start)?),
                Event::Text(text) => {
                    if let Some(&idx) = open.last() {
                        elements[idx].text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(&idx) = open.last() {
                        let raw = data.into_inner();
                        elements[idx].text.push_str(&String::from_utf8_lossy(&raw));
                    }
                }
                Event::End(_) => {
                    open.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(&idx) = open.last() {
            return Err(ParseError::UnexpectedFormat(format!(
                "unclosed element <{}>",
                elements[idx].name
            )));
        }

        Ok(Self { elements })
    }

    /// Returns the text of the first element with the given name.
    ///
    /// An element that exists but has no text yields `Some("")`.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.elements
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.text.as_str())
    }

    /// Returns the text of the first element whose `id` attribute matches.
    #[must_use]
    pub fn text_by_id(&self, id: &str) -> Option<&str> {
        self.elements
            .iter()
            .find(|e| e.id.as_deref() == Some(id))
            .map(|e| e.text.as_str())
    }

    /// Returns `true` if the document has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<rx>
  <cmd><zone1>ON</zone1><zone2>OFF</zone2></cmd>
  <cmd><volume>-40.0</volume><disptype>ABSOLUTE</disptype><dispvalue>30</dispvalue></cmd>
  <cmd><mute>off</mute></cmd>
  <cmd><source>TUNER</source></cmd>
</rx>"#;

    #[test]
    fn finds_nested_elements() {
        let doc = XmlDocument::parse(BASE_RESPONSE).unwrap();
        assert_eq!(doc.text("zone1"), Some("ON"));
        assert_eq!(doc.text("dispvalue"), Some("30"));
        assert_eq!(doc.text("mute"), Some("off"));
        assert_eq!(doc.text("source"), Some("TUNER"));
    }

    #[test]
    fn first_match_wins() {
        let doc = XmlDocument::parse("<rx><a>1</a><b><a>2</a></b></rx>").unwrap();
        assert_eq!(doc.text("a"), Some("1"));
    }

    #[test]
    fn empty_elements_have_empty_text() {
        let doc = XmlDocument::parse("<rx><source/><band></band></rx>").unwrap();
        assert_eq!(doc.text("source"), Some(""));
        assert_eq!(doc.text("band"), Some(""));
    }

    #[test]
    fn lookup_by_id() {
        let doc = XmlDocument::parse(
            r#"<rx><szLine><value id="artist">Band</value><value id="track">Song &amp; Dance</value></szLine></rx>"#,
        )
        .unwrap();
        assert_eq!(doc.text_by_id("track"), Some("Song & Dance"));
        assert_eq!(doc.text_by_id("album"), None);
    }

    #[test]
    fn cdata_is_text() {
        let doc = XmlDocument::parse("<rx><title><![CDATA[A <b> C]]></title></rx>").unwrap();
        assert_eq!(doc.text("title"), Some("A <b> C"));
    }

    #[test]
    fn mismatched_tags_are_rejected() {
        let result = XmlDocument::parse("<rx><zone1>ON</zone2></rx>");
        assert!(matches!(result, Err(ParseError::Xml(_))));
    }

    #[test]
    fn unclosed_document_is_rejected() {
        assert!(XmlDocument::parse("<rx><zone1>ON</zone1>").is_err());
    }

    #[test]
    fn empty_input_is_empty_document() {
        let doc = XmlDocument::parse("").unwrap();
        assert!(doc.is_empty());
    }
}
