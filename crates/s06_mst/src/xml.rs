//! Mapping between [`StringTable`] and the `mst06` XML document form.
//!
//! The XML form is what translators edit: one `message` element per entry,
//! text content escaped via [`crate::escape`], and the captured
//! differential offset table carried along in a `DiffOffTbl` element so a
//! rebuilt binary stays byte-identical to its source.

use std::io::Write;

use bon::Builder;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::instrument;
use widestring::U16String;

use crate::error::{Error, Result};
use crate::escape::{escape, unescape};
use crate::text;
use crate::types::{StringEntry, StringTable};

/// Indentation style for the XML writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Indent {
    /// One tab per nesting level
    #[default]
    Tabs,

    /// A fixed number of spaces per nesting level
    Spaces(usize),
}

impl Indent {
    const fn as_pair(self) -> (u8, usize) {
        match self {
            Indent::Tabs => (b'\t', 1),
            Indent::Spaces(count) => (b' ', count),
        }
    }
}

/// Options for how the XML document should be written
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct XmlOptions {
    /// Indentation style; tabs unless asked otherwise
    #[builder(default)]
    pub indent: Indent,
}

impl StringTable {
    /// Write the table as an `mst06` XML document.
    #[instrument(skip_all, err)]
    pub fn write_xml<W: Write>(&self, writer: W, options: XmlOptions) -> Result<()> {
        if self.is_empty() {
            return Err(Error::EmptyTable);
        }

        let (indent_char, indent_size) = options.indent.as_pair();
        let mut xml = Writer::new_with_indent(writer, indent_char, indent_size);

        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("mst06");
        root.push_attribute(("name", self.name()));
        root.push_attribute(("mst_version", self.version().to_string().as_str()));
        root.push_attribute(("endianness", if self.big_endian() { "B" } else { "L" }));
        xml.write_event(Event::Start(root))?;

        for (index, entry) in self.entries().iter().enumerate() {
            let mut message = BytesStart::new("message");
            message.push_attribute(("index", index.to_string().as_str()));
            message.push_attribute(("name", entry.name.as_str()));
            if let Some(placeholder) = self.placeholder(index) {
                message.push_attribute(("placeholder", escape(placeholder).as_str()));
            }

            if entry.text.is_empty() {
                xml.write_event(Event::Empty(message))?;
            } else {
                let escaped = escape(&text::utf16_to_utf8(&entry.text));
                xml.write_event(Event::Start(message))?;
                xml.write_event(Event::Text(BytesText::new(&escaped)))?;
                xml.write_event(Event::End(BytesEnd::new("message")))?;
            }
        }

        if let Some(raw) = self.diff_tbl() {
            xml.write_event(Event::Start(BytesStart::new("DiffOffTbl")))?;
            xml.write_event(Event::Text(BytesText::new(&diff_tbl_to_text(raw))))?;
            xml.write_event(Event::End(BytesEnd::new("DiffOffTbl")))?;
        }

        xml.write_event(Event::End(BytesEnd::new("mst06")))?;
        Ok(())
    }

    /// Convenience wrapper over [`StringTable::write_xml`] returning the
    /// document as a string.
    pub fn to_xml_string(&self, options: XmlOptions) -> Result<String> {
        let mut out = Vec::new();
        self.write_xml(&mut out, options)?;
        // the writer only ever emits UTF-8
        Ok(String::from_utf8(out).expect("XML writer produced invalid UTF-8"))
    }

    /// Parse an `mst06` XML document.
    ///
    /// Attribute-level problems are pushed onto `warnings` and skip only
    /// the affected `message` element; missing document structure is an
    /// error. Duplicate indices follow last-writer-wins, with a warning.
    #[instrument(skip_all, err)]
    pub fn read_xml(document: &str, warnings: &mut Vec<String>) -> Result<StringTable> {
        let mut reader = Reader::from_str(document);

        let mut table: Option<StringTable> = None;
        let mut message: Option<PendingMessage> = None;
        let mut in_diff_tbl = false;
        let mut diff_tbl: Option<Vec<u8>> = None;
        let mut text_buf = String::new();

        loop {
            let position = reader.buffer_position() as u64;
            match reader.read_event()? {
                Event::Start(ref element) | Event::Empty(ref element)
                    if element.name().as_ref() == b"mst06" =>
                {
                    table = Some(parse_root(element)?);
                }
                Event::Start(ref element) if element.name().as_ref() == b"message" => {
                    if table.is_none() {
                        return Err(missing_root());
                    }
                    message = parse_message(element, position, warnings)?;
                    text_buf.clear();
                }
                Event::Empty(ref element) if element.name().as_ref() == b"message" => {
                    let Some(table) = table.as_mut() else {
                        return Err(missing_root());
                    };
                    if let Some(pending) = parse_message(element, position, warnings)? {
                        finish_message(table, pending, "", position, warnings);
                    }
                }
                Event::End(ref element) if element.name().as_ref() == b"message" => {
                    if let (Some(pending), Some(table)) = (message.take(), table.as_mut()) {
                        finish_message(table, pending, &text_buf, position, warnings);
                    }
                    text_buf.clear();
                }
                Event::Start(ref element) if element.name().as_ref() == b"DiffOffTbl" => {
                    in_diff_tbl = true;
                    text_buf.clear();
                }
                Event::End(ref element) if element.name().as_ref() == b"DiffOffTbl" => {
                    diff_tbl = Some(diff_tbl_from_text(&text_buf));
                    in_diff_tbl = false;
                    text_buf.clear();
                }
                Event::Text(ref element) => {
                    if message.is_some() || in_diff_tbl {
                        text_buf.push_str(&element.unescape()?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let mut table = table.ok_or_else(missing_root)?;
        if table.is_empty() {
            return Err(Error::XmlStructure(
                "\"mst06\" element has no \"message\" elements.".into(),
            ));
        }
        table.set_diff_tbl(diff_tbl);

        Ok(table)
    }
}

struct PendingMessage {
    index: usize,
    name: String,
    placeholder: Option<String>,
}

fn missing_root() -> Error {
    Error::XmlStructure("\"mst06\" element not found.".into())
}

/// Pull an attribute value off an element, XML-entity unescaped.
fn attribute(element: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes().flatten() {
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn parse_root(element: &BytesStart) -> Result<StringTable> {
    let name = attribute(element, b"name")?.ok_or_else(|| {
        Error::XmlStructure("\"mst06\" element has no \"name\" attribute.".into())
    })?;
    if name.is_empty() {
        return Err(Error::XmlStructure(
            "\"mst06\" element's \"name\" attribute is empty.".into(),
        ));
    }

    let version = attribute(element, b"mst_version")?.unwrap_or_else(|| "1".into());
    if version != "1" {
        return Err(Error::UnsupportedVersion(
            version.chars().next().unwrap_or('?'),
        ));
    }

    let big_endian = match attribute(element, b"endianness")?.as_deref() {
        None | Some("B") => true,
        Some("L") => false,
        Some(other) => {
            return Err(Error::InvalidEndianness(
                other.bytes().next().unwrap_or(0),
            ))
        }
    };

    Ok(StringTable::new(name, big_endian))
}

/// Parse a `message` element's attributes; `None` skips the element.
fn parse_message(
    element: &BytesStart,
    position: u64,
    warnings: &mut Vec<String>,
) -> Result<Option<PendingMessage>> {
    let index = match attribute(element, b"index")? {
        None => {
            warnings.push(format!(
                "Byte {position}: \"message\" element has no \"index\" attribute."
            ));
            return Ok(None);
        }
        Some(value) => match value.parse::<usize>() {
            Ok(index) => index,
            Err(_) => {
                warnings.push(format!(
                    "Byte {position}: \"message\" element's \"index\" attribute is not an unsigned integer."
                ));
                return Ok(None);
            }
        },
    };

    let name = match attribute(element, b"name")? {
        None => {
            warnings.push(format!(
                "Byte {position}: \"message\" element has no \"name\" attribute."
            ));
            return Ok(None);
        }
        Some(name) if name.is_empty() => {
            warnings.push(format!(
                "Byte {position}: \"message\" element has an empty \"name\" attribute."
            ));
            return Ok(None);
        }
        Some(name) => name,
    };

    let placeholder = attribute(element, b"placeholder")?.map(|p| unescape(&p));

    Ok(Some(PendingMessage {
        index,
        name,
        placeholder,
    }))
}

fn finish_message(
    table: &mut StringTable,
    pending: PendingMessage,
    text: &str,
    position: u64,
    warnings: &mut Vec<String>,
) {
    let body: U16String = text::utf8_to_utf16(&unescape(text));
    let displaced = table.put_entry(pending.index, StringEntry::new(pending.name, body));
    if displaced {
        warnings.push(format!(
            "Byte {position}: Duplicate message index {}. This message will supersede the previous message.",
            pending.index
        ));
    }
    match pending.placeholder {
        Some(placeholder) => table.set_placeholder(pending.index, placeholder),
        None => table.clear_placeholder(pending.index),
    }
}

/// Render raw differential-offset-table bytes as escaped text.
///
/// Printable ASCII stays literal (the table is mostly `'A'`/`'B'` codes);
/// everything else becomes a `\xHH` escape.
fn diff_tbl_to_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if b.is_ascii_graphic() && b != b'\\' {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\x{b:02X}"));
        }
    }
    out
}

/// Inverse of [`diff_tbl_to_text`], tolerating stray whitespace.
fn diff_tbl_from_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\'
            && i + 4 <= bytes.len()
            && bytes[i + 1] == b'x'
            && bytes[i + 2].is_ascii_hexdigit()
            && bytes[i + 3].is_ascii_hexdigit()
        {
            let value = u8::from_str_radix(&text[i + 2..i + 4], 16).unwrap();
            out.push(value);
            i += 4;
        } else if b.is_ascii_whitespace() {
            i += 1;
        } else {
            out.push(b);
            i += 1;
        }
    }
    out
}
