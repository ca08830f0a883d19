//! Generic XML tree for Query API responses.
//!
//! Responses are parsed into nested [`XmlNode`]s keyed by local element name.
//! Elements repeated under one parent become an [`XmlValue::List`], and so do
//! elements named `item` or `Errors` (ASCII case-insensitive) even when they
//! occur only once, so callers never have to guess between one and many.

use std::mem;

use elbsign_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Element names that are always exposed as a sequence.
const FORCED_ARRAY_NAMES: [&str; 2] = ["item", "Errors"];

fn is_forced_array(name: &str) -> bool {
    FORCED_ARRAY_NAMES
        .iter()
        .any(|v| v.eq_ignore_ascii_case(name))
}

/// Value of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue {
    /// Element without child elements, holding its text as is.
    ///
    /// Whitespace-only text is empty.
    Text(String),
    /// Element with child elements.
    Node(XmlNode),
    /// Repeated or forced-array element, in document order.
    List(Vec<XmlValue>),
}

impl XmlValue {
    /// Get the text if this is a text element.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Get the node if this is an element with children.
    pub fn as_node(&self) -> Option<&XmlNode> {
        match self {
            XmlValue::Node(v) => Some(v),
            _ => None,
        }
    }

    /// Get the items if this is a sequence.
    pub fn as_list(&self) -> Option<&[XmlValue]> {
        match self {
            XmlValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Iterate the occurrences of this element.
    ///
    /// A sequence yields its items, anything else yields itself once.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &XmlValue> + '_> {
        match self {
            XmlValue::List(items) => Box::new(items.iter()),
            v => Box::new(std::iter::once(v)),
        }
    }
}

/// Children of one element, in document order, keyed by local name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    children: Vec<(String, XmlValue)>,
}

impl XmlNode {
    /// Get the child element with given name.
    pub fn get(&self, name: &str) -> Option<&XmlValue> {
        self.children
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Get the text of the child element with given name.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(XmlValue::as_text)
    }

    /// Walk down through nested nodes, like `["ResponseMetadata", "RequestId"]`.
    pub fn path(&self, names: &[&str]) -> Option<&XmlValue> {
        let (last, parents) = names.split_last()?;
        let mut node = self;
        for name in parents {
            node = self_or_first(node.get(name)?)?.as_node()?;
        }
        node.get(last)
    }

    /// Iterate children as `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &XmlValue)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check whether this element has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn insert(&mut self, name: String, value: XmlValue) {
        if let Some((_, existing)) = self.children.iter_mut().find(|(k, _)| *k == name) {
            match existing {
                XmlValue::List(items) => items.push(value),
                other => {
                    let first = mem::replace(other, XmlValue::List(Vec::with_capacity(2)));
                    *other = XmlValue::List(vec![first, value]);
                }
            }
            return;
        }

        let value = if is_forced_array(&name) {
            XmlValue::List(vec![value])
        } else {
            value
        };
        self.children.push((name, value));
    }
}

fn self_or_first(v: &XmlValue) -> Option<&XmlValue> {
    match v {
        XmlValue::List(items) => items.first(),
        v => Some(v),
    }
}

/// A parsed response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// Local name of the root element.
    pub root: String,
    /// Children of the root element.
    pub body: XmlNode,
}

impl XmlDocument {
    /// Parse a response body.
    pub fn parse(xml: &str) -> Result<Self> {
        // Text is kept verbatim; whitespace between elements is dropped on `End`.
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        // (name, children, text) of every open element.
        let mut stack: Vec<(String, XmlNode, String)> = Vec::new();
        let mut doc: Option<XmlDocument> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                Error::unexpected("failed to parse xml response")
                    .with_source(e)
                    .with_context(format!("position: {}", reader.buffer_position()))
            })?;

            match event {
                Event::Start(e) => {
                    if doc.is_some() && stack.is_empty() {
                        return Err(Error::unexpected("xml response has more than one root"));
                    }
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    stack.push((name, XmlNode::default(), String::new()));
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    match stack.last_mut() {
                        Some((_, parent, _)) => parent.insert(name, XmlValue::Text(String::new())),
                        None if doc.is_none() => {
                            doc = Some(XmlDocument {
                                root: name,
                                body: XmlNode::default(),
                            })
                        }
                        None => {
                            return Err(Error::unexpected("xml response has more than one root"))
                        }
                    }
                }
                Event::Text(e) => {
                    if let Some((_, _, text)) = stack.last_mut() {
                        let v = e.unescape().map_err(|err| {
                            Error::unexpected("invalid escape in xml response").with_source(err)
                        })?;
                        text.push_str(&v);
                    }
                }
                Event::CData(e) => {
                    if let Some((_, _, text)) = stack.last_mut() {
                        text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::End(_) => {
                    let Some((name, node, text)) = stack.pop() else {
                        return Err(Error::unexpected("unbalanced xml response"));
                    };
                    match stack.last_mut() {
                        Some((_, parent, _)) => {
                            let value = if !node.is_empty() {
                                XmlValue::Node(node)
                            } else if text.trim().is_empty() {
                                XmlValue::Text(String::new())
                            } else {
                                XmlValue::Text(text)
                            };
                            parent.insert(name, value);
                        }
                        None => doc = Some(XmlDocument { root: name, body: node }),
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::unexpected("xml response ended before all elements were closed"));
        }
        doc.ok_or_else(|| Error::unexpected("xml response has no root element"))
    }

    /// Get a child of the root element.
    pub fn get(&self, name: &str) -> Option<&XmlValue> {
        self.body.get(name)
    }

    /// Check whether the service reported errors.
    ///
    /// Both `<Errors><Error/></Errors>` and AWS's `<ErrorResponse><Error/></ErrorResponse>`
    /// shapes count.
    pub fn has_errors(&self) -> bool {
        self.body.get("Errors").is_some() || self.body.get("Error").is_some()
    }

    /// Get the request id, from `RequestID`, `RequestId` or `ResponseMetadata/RequestId`.
    pub fn request_id(&self) -> Option<&str> {
        self.body
            .text("RequestID")
            .or_else(|| self.body.text("RequestId"))
            .or_else(|| {
                self.body
                    .path(&["ResponseMetadata", "RequestId"])
                    .and_then(XmlValue::as_text)
            })
    }
}
