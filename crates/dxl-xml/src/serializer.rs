//! # XML Serializer
//!
//! A thin streaming layer over `quick_xml::Writer` with the element-at-a-time
//! contract operators serialize against:
//!
//! ```text
//! open_element("Ident")
//! add_attribute("ColId", 1)
//! add_attribute("ColName", "a")
//! close_element("Ident")          ->  <dxl:Ident ColId="1" ColName="a"/>
//! ```
//!
//! ## Pending Start Tag
//!
//! The start tag of the most recently opened element is buffered, so attributes
//! can be added until the first child element is opened or the element is closed.
//! An element closed while its start tag is still pending has no children and is
//! written in empty-element form.
//!
//! All element names are written in the `dxl` namespace.

use crate::tokens;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::fmt::Display;

/// Output knobs of the serializer.
#[derive(Debug, Clone)]
pub struct SerializerOptions {
    /// Newline and two-space indentation per nesting level.
    pub indent: bool,
    /// Emit an `<?xml ...?>` declaration before the document.
    pub include_header: bool,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            indent: true,
            include_header: true,
        }
    }
}

/// Errors raised while writing DXL.
#[derive(Debug, thiserror::Error)]
pub enum ProduceError {
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),
    /// `add_attribute` was called after the start tag had been flushed.
    #[error("attribute {0} added with no open start tag")]
    NoPendingElement(String),
    /// `close_element` did not match the innermost open element.
    #[error("closing element {found} while {expected} is open")]
    MismatchedClose { expected: String, found: String },
    #[error("document finished with {0} unclosed element(s)")]
    Unclosed(usize),
    #[error("serialized document is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub struct XmlSerializer {
    writer: Writer<Vec<u8>>,
    pending: Option<BytesStart<'static>>,
    open: Vec<String>,
}

impl XmlSerializer {
    pub fn new(options: &SerializerOptions) -> Result<Self, ProduceError> {
        let writer = if options.indent {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };
        let mut ser = Self {
            writer,
            pending: None,
            open: Vec::new(),
        };
        if options.include_header {
            ser.writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }
        Ok(ser)
    }

    fn qualified(name: &str) -> String {
        format!("{}:{}", tokens::NAMESPACE_PREFIX, name)
    }

    fn flush_pending(&mut self) -> Result<(), ProduceError> {
        if let Some(start) = self.pending.take() {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }

    pub fn open_element(&mut self, name: &str) -> Result<(), ProduceError> {
        self.flush_pending()?;
        let qualified = Self::qualified(name);
        self.pending = Some(BytesStart::new(qualified));
        self.open.push(name.to_string());
        Ok(())
    }

    /// Add an attribute to the pending start tag. Values are written through their
    /// `Display` form: booleans as `true`/`false`, integers in decimal, metadata
    /// ids in their wire form.
    pub fn add_attribute<V: Display>(&mut self, name: &str, value: V) -> Result<(), ProduceError> {
        let start = self
            .pending
            .as_mut()
            .ok_or_else(|| ProduceError::NoPendingElement(name.to_string()))?;
        let value = value.to_string();
        start.push_attribute((name, value.as_str()));
        Ok(())
    }

    pub fn add_opt_attribute<V: Display>(
        &mut self,
        name: &str,
        value: Option<V>,
    ) -> Result<(), ProduceError> {
        match value {
            Some(v) => self.add_attribute(name, v),
            None => Ok(()),
        }
    }

    /// Comma-separated list without spaces.
    pub fn add_list_attribute<V: Display>(
        &mut self,
        name: &str,
        values: &[V],
    ) -> Result<(), ProduceError> {
        let joined = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.add_attribute(name, joined)
    }

    pub fn close_element(&mut self, name: &str) -> Result<(), ProduceError> {
        match self.open.pop() {
            Some(open) if open == name => {}
            Some(open) => {
                return Err(ProduceError::MismatchedClose {
                    expected: open,
                    found: name.to_string(),
                })
            }
            None => {
                return Err(ProduceError::MismatchedClose {
                    expected: String::new(),
                    found: name.to_string(),
                })
            }
        }
        match self.pending.take() {
            Some(start) => self.writer.write_event(Event::Empty(start))?,
            None => self
                .writer
                .write_event(Event::End(BytesEnd::new(Self::qualified(name))))?,
        }
        Ok(())
    }

    pub fn finish(self) -> Result<String, ProduceError> {
        if !self.open.is_empty() {
            return Err(ProduceError::Unclosed(self.open.len()));
        }
        Ok(String::from_utf8(self.writer.into_inner())?)
    }
}
