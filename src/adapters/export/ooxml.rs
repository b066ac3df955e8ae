//! Office Open XML packaging helpers.
//!
//! `XmlBuilder` writes one part with quick-xml; `Package` collects parts into
//! the zip container shared by `.docx` and `.pptx`.

use std::borrow::Cow;
use std::io::{Cursor, Write};

use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::ports::ExportError;

pub const RELS_CONTENT_TYPE: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const PACKAGE_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
pub const CORE_PROPERTIES_REL: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const CORE_PROPERTIES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-package.core-properties+xml";

fn xml_error(err: impl std::fmt::Display) -> ExportError {
    ExportError::serialization(format!("XML write failed: {}", err))
}

/// Characters XML 1.0 allows in a document. Rust `char` already excludes
/// surrogates.
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Drops characters XML 1.0 cannot carry, such as the C0 controls a model
/// reply may hold as JSON escapes.
pub fn xml_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

fn element<'a>(name: &'a str, attrs: &[(&str, &str)]) -> BytesStart<'a> {
    let mut element = BytesStart::new(name);
    for (key, value) in attrs {
        let value = xml_safe(value);
        element.push_attribute((*key, &*value));
    }
    element
}

fn zip_error(err: impl std::fmt::Display) -> ExportError {
    ExportError::serialization(format!("Zip write failed: {}", err))
}

/// Streaming writer for a single XML part.
pub struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    /// Starts a standalone UTF-8 part.
    pub fn new() -> Result<Self, ExportError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_error)?;
        Ok(Self { writer })
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
        self.writer
            .write_event(Event::Start(element(name, attrs)))
            .map_err(xml_error)
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
        self.writer
            .write_event(Event::Empty(element(name, attrs)))
            .map_err(xml_error)
    }

    pub fn end(&mut self, name: &str) -> Result<(), ExportError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    /// Writes escaped character data, without characters XML cannot carry.
    pub fn text(&mut self, text: &str) -> Result<(), ExportError> {
        self.writer
            .write_event(Event::Text(BytesText::new(&xml_safe(text))))
            .map_err(xml_error)
    }

    /// `<name attrs>text</name>`
    pub fn text_element(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> Result<(), ExportError> {
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

/// A relationship entry for a `.rels` part.
pub struct Relationship<'a> {
    pub id: String,
    pub rel_type: &'a str,
    pub target: String,
}

/// Writes a `.rels` part.
pub fn relationships_part(rels: &[Relationship<'_>]) -> Result<Vec<u8>, ExportError> {
    let mut xml = XmlBuilder::new()?;
    xml.start("Relationships", &[("xmlns", PACKAGE_RELS_NS)])?;
    for rel in rels {
        xml.empty(
            "Relationship",
            &[
                ("Id", rel.id.as_str()),
                ("Type", rel.rel_type),
                ("Target", rel.target.as_str()),
            ],
        )?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

/// Writes `[Content_Types].xml` from `(part name, content type)` overrides.
pub fn content_types_part(overrides: &[(String, &str)]) -> Result<Vec<u8>, ExportError> {
    let mut xml = XmlBuilder::new()?;
    xml.start("Types", &[("xmlns", CONTENT_TYPES_NS)])?;
    xml.empty(
        "Default",
        &[("Extension", "rels"), ("ContentType", RELS_CONTENT_TYPE)],
    )?;
    xml.empty(
        "Default",
        &[("Extension", "xml"), ("ContentType", "application/xml")],
    )?;
    for (part, content_type) in overrides {
        xml.empty(
            "Override",
            &[("PartName", part.as_str()), ("ContentType", *content_type)],
        )?;
    }
    xml.end("Types")?;
    Ok(xml.finish())
}

/// Writes `docProps/core.xml` with the document title and creation time.
pub fn core_properties_part(title: &str) -> Result<Vec<u8>, ExportError> {
    let created = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    let mut xml = XmlBuilder::new()?;
    xml.start(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    xml.text_element("dc:title", &[], title)?;
    xml.text_element("dc:creator", &[], "EduGen")?;
    xml.text_element("dc:language", &[], "vi-VN")?;
    xml.text_element("dcterms:created", &[("xsi:type", "dcterms:W3CDTF")], &created)?;
    xml.end("cp:coreProperties")?;
    Ok(xml.finish())
}

/// Zip container under construction.
pub struct Package {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}

impl Package {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    pub fn add(&mut self, path: &str, content: &[u8]) -> Result<(), ExportError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(path, options).map_err(zip_error)?;
        self.zip.write_all(content).map_err(zip_error)
    }

    pub fn finish(self) -> Result<Vec<u8>, ExportError> {
        let cursor = self.zip.finish().map_err(zip_error)?;
        Ok(cursor.into_inner())
    }
}
