//! Streaming XML front end
//!
//! Pull-style event reader over quick-xml: resolves namespaces through the
//! per-parse scope stack, synthesizes open/close pairs for empty elements
//! and enforces the configured limits. The engine's dispatch loop consumes
//! one [`XmlEvent`] at a time, in document order.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{NamespaceScopes, QName};

/// A resolved attribute on an opened element
#[derive(Debug, Clone)]
pub struct AttributeValue {
    /// Attribute qualified name
    pub qname: QName,
    /// Unescaped attribute value
    pub value: String,
}

/// A resolved element-open event
#[derive(Debug, Clone)]
pub struct ElementStart {
    /// Element qualified name
    pub qname: QName,
    /// Attributes in source order (namespace declarations excluded)
    pub attributes: Vec<AttributeValue>,
    /// Byte position of the event in the input
    pub position: u64,
}

impl ElementStart {
    /// Get an attribute value by local name, ignoring namespaces
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.qname.local_name() == local_name)
            .map(|a| a.value.as_str())
    }

    /// Get an attribute value by namespace and local name
    pub fn attribute_ns(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.qname.namespace() == Some(namespace) && a.qname.local_name() == local_name)
            .map(|a| a.value.as_str())
    }
}

/// One event of the forward-only stream
#[derive(Debug, Clone)]
pub enum XmlEvent {
    /// Element open (also synthesized for empty elements)
    Open(ElementStart),
    /// Character data
    Text(String),
    /// Element close, with the resolved qualified name
    Close(QName),
}

/// Pull-style event reader over a byte slice
pub struct EventReader<'a> {
    reader: Reader<&'a [u8]>,
    scopes: NamespaceScopes,
    limits: Limits,
    depth: usize,
    pending_close: Option<QName>,
    buf: Vec<u8>,
}

impl<'a> EventReader<'a> {
    /// Create a reader over an XML string
    pub fn new(xml: &'a str, limits: Limits) -> Result<Self> {
        limits.check_document_size(xml.len())?;
        Ok(Self {
            reader: Reader::from_reader(xml.as_bytes()),
            scopes: NamespaceScopes::new(),
            limits,
            depth: 0,
            pending_close: None,
            buf: Vec::new(),
        })
    }

    /// Current byte position in the input
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// Read the next event, or `None` at end of input
    pub fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        if let Some(qname) = self.pending_close.take() {
            self.depth -= 1;
            return Ok(Some(XmlEvent::Close(qname)));
        }

        loop {
            self.buf.clear();
            let position = self.reader.buffer_position() as u64;
            match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(e)) => {
                    let start = Self::open_element(
                        &mut self.scopes,
                        &self.limits,
                        &mut self.depth,
                        position,
                        &e,
                    )?;
                    return Ok(Some(XmlEvent::Open(start)));
                }
                Ok(Event::Empty(e)) => {
                    let start = Self::open_element(
                        &mut self.scopes,
                        &self.limits,
                        &mut self.depth,
                        position,
                        &e,
                    )?;
                    self.pending_close = Some(start.qname.clone());
                    self.scopes.pop_scope();
                    return Ok(Some(XmlEvent::Open(start)));
                }
                Ok(Event::End(e)) => {
                    let name = std::str::from_utf8(e.name().as_ref())
                        .map_err(|err| Error::Xml(format!("invalid element name: {}", err)))?
                        .to_string();
                    let qname = self.scopes.resolve_element(&name)?;
                    self.scopes.pop_scope();
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(Some(XmlEvent::Close(qname)));
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::Xml(format!("cannot unescape text: {}", err)))?
                        .into_owned();
                    if text.is_empty() {
                        continue;
                    }
                    return Ok(Some(XmlEvent::Text(text)));
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    if text.is_empty() {
                        continue;
                    }
                    return Ok(Some(XmlEvent::Text(text)));
                }
                Ok(Event::Eof) => return Ok(None),
                Ok(_) => continue, // declarations, comments, processing instructions
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "error parsing XML at position {}: {}",
                        self.reader.buffer_position(),
                        e
                    )))
                }
            }
        }
    }

    fn open_element(
        scopes: &mut NamespaceScopes,
        limits: &Limits,
        depth: &mut usize,
        position: u64,
        start: &BytesStart,
    ) -> Result<ElementStart> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::Xml(format!("invalid element name: {}", e)))?
            .to_string();

        // Namespace declarations first: they apply to the element itself
        let mut declarations = Vec::new();
        let mut raw_attributes = Vec::new();
        for attr_result in start.attributes() {
            let attr =
                attr_result.map_err(|e| Error::Xml(format!("cannot parse attribute: {}", e)))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("invalid attribute name: {}", e)))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("cannot unescape attribute value: {}", e)))?
                .into_owned();

            if key == "xmlns" {
                declarations.push((None, value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                declarations.push((Some(prefix.to_string()), value));
            } else {
                raw_attributes.push((key, value));
            }
        }
        scopes.push_scope(declarations);

        *depth += 1;
        limits.check_xml_depth(*depth)?;
        limits.check_attributes(raw_attributes.len())?;

        let qname = scopes.resolve_element(&name)?;
        let mut attributes = Vec::with_capacity(raw_attributes.len());
        for (key, value) in raw_attributes {
            attributes.push(AttributeValue {
                qname: scopes.resolve_attribute(&key)?,
                value,
            });
        }

        Ok(ElementStart {
            qname,
            attributes,
            position,
        })
    }
}
