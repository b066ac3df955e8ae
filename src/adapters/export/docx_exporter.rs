//! Word export.
//!
//! Writes a WordprocessingML package that mirrors the on-screen plan: title,
//! metadata lines, the three numbered sections, and a full-width procedure
//! table whose cells keep one paragraph per line.

use async_trait::async_trait;

use crate::domain::lesson_plan::LessonPlan;
use crate::ports::{ExportError, ExportFormat, ExportedDocument, PlanExporter};

use super::ooxml::{
    content_types_part, core_properties_part, relationships_part, Package, Relationship,
    XmlBuilder, CORE_PROPERTIES_CONTENT_TYPE, CORE_PROPERTIES_REL, OFFICE_DOCUMENT_REL,
};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const STYLES_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const DOCUMENT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const STYLES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";

/// Table grid in twentieths of a point; A4 text width split 1:2:1.
const COLUMN_WIDTHS: [u32; 3] = [2256, 4514, 2256];

/// Word (.docx) exporter.
#[derive(Debug, Clone, Default)]
pub struct DocxExporter;

impl DocxExporter {
    pub fn new() -> Self {
        Self
    }

    /// Builds the complete `.docx` package.
    pub fn render(plan: &LessonPlan) -> Result<Vec<u8>, ExportError> {
        let mut package = Package::new();

        package.add(
            "[Content_Types].xml",
            &content_types_part(&[
                ("/word/document.xml".to_string(), DOCUMENT_CONTENT_TYPE),
                ("/word/styles.xml".to_string(), STYLES_CONTENT_TYPE),
                ("/docProps/core.xml".to_string(), CORE_PROPERTIES_CONTENT_TYPE),
            ])?,
        )?;
        package.add(
            "_rels/.rels",
            &relationships_part(&[
                Relationship {
                    id: "rId1".to_string(),
                    rel_type: OFFICE_DOCUMENT_REL,
                    target: "word/document.xml".to_string(),
                },
                Relationship {
                    id: "rId2".to_string(),
                    rel_type: CORE_PROPERTIES_REL,
                    target: "docProps/core.xml".to_string(),
                },
            ])?,
        )?;
        package.add(
            "word/_rels/document.xml.rels",
            &relationships_part(&[Relationship {
                id: "rId1".to_string(),
                rel_type: STYLES_REL,
                target: "styles.xml".to_string(),
            }])?,
        )?;
        package.add("word/styles.xml", STYLES_XML.as_bytes())?;
        package.add("docProps/core.xml", &core_properties_part(&plan.title)?)?;
        package.add("word/document.xml", &document_part(plan)?)?;

        package.finish()
    }
}

#[async_trait]
impl PlanExporter for DocxExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Docx
    }

    async fn export(&self, plan: &LessonPlan) -> Result<ExportedDocument, ExportError> {
        let content = Self::render(plan)?;
        Ok(ExportedDocument::new(content, ExportFormat::Docx, &plan.title))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Document body
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default)]
struct ParagraphProps<'a> {
    style: Option<&'a str>,
    centered: bool,
    space_before: Option<u32>,
    space_after: Option<u32>,
}

impl<'a> ParagraphProps<'a> {
    fn styled(style: &'a str) -> Self {
        Self {
            style: Some(style),
            ..Default::default()
        }
    }

    fn before(mut self, twips: u32) -> Self {
        self.space_before = Some(twips);
        self
    }

    fn after(mut self, twips: u32) -> Self {
        self.space_after = Some(twips);
        self
    }

    fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    fn is_empty(&self) -> bool {
        self.style.is_none()
            && !self.centered
            && self.space_before.is_none()
            && self.space_after.is_none()
    }
}

fn document_part(plan: &LessonPlan) -> Result<Vec<u8>, ExportError> {
    let mut xml = XmlBuilder::new()?;
    xml.start("w:document", &[("xmlns:w", W_NS), ("xmlns:r", R_NS)])?;
    xml.start("w:body", &[])?;

    paragraph(
        &mut xml,
        ParagraphProps::styled("Title").centered().after(400),
        &[(plan.title.as_str(), false)],
    )?;
    labelled(&mut xml, "Lĩnh vực phát triển: ", &plan.development_field, None)?;
    labelled(&mut xml, "Độ tuổi: ", &plan.age_group, None)?;
    labelled(&mut xml, "Phương pháp: ", &plan.method, Some(400))?;

    heading(&mut xml, "I. Mục đích - Yêu cầu", 200)?;
    item_group(&mut xml, "1. Kiến thức", &plan.objectives.knowledge, false)?;
    item_group(&mut xml, "2. Kỹ năng", &plan.objectives.skills, true)?;
    item_group(&mut xml, "3. Thái độ", &plan.objectives.attitude, true)?;

    heading(&mut xml, "II. Chuẩn bị", 400)?;
    item_group(&mut xml, "1. Đồ dùng của cô", &plan.preparation.teacher, false)?;
    item_group(&mut xml, "2. Đồ dùng của trẻ", &plan.preparation.students, true)?;

    heading(&mut xml, "III. Tiến trình hoạt động", 400)?;
    procedure_table(&mut xml, plan)?;

    section_properties(&mut xml)?;
    xml.end("w:body")?;
    xml.end("w:document")?;
    Ok(xml.finish())
}

fn paragraph(
    xml: &mut XmlBuilder,
    props: ParagraphProps<'_>,
    runs: &[(&str, bool)],
) -> Result<(), ExportError> {
    xml.start("w:p", &[])?;

    if !props.is_empty() {
        xml.start("w:pPr", &[])?;
        if let Some(style) = props.style {
            xml.empty("w:pStyle", &[("w:val", style)])?;
        }
        let before = props.space_before.map(|v| v.to_string());
        let after = props.space_after.map(|v| v.to_string());
        if before.is_some() || after.is_some() {
            let mut attrs = Vec::new();
            if let Some(before) = before.as_deref() {
                attrs.push(("w:before", before));
            }
            if let Some(after) = after.as_deref() {
                attrs.push(("w:after", after));
            }
            xml.empty("w:spacing", &attrs)?;
        }
        if props.centered {
            xml.empty("w:jc", &[("w:val", "center")])?;
        }
        xml.end("w:pPr")?;
    }

    for (text, bold) in runs {
        run(xml, text, *bold)?;
    }
    xml.end("w:p")
}

fn run(xml: &mut XmlBuilder, text: &str, bold: bool) -> Result<(), ExportError> {
    xml.start("w:r", &[])?;
    if bold {
        xml.start("w:rPr", &[])?;
        xml.empty("w:b", &[])?;
        xml.end("w:rPr")?;
    }
    xml.text_element("w:t", &[("xml:space", "preserve")], text)?;
    xml.end("w:r")
}

/// Bold label followed by a plain value.
fn labelled(
    xml: &mut XmlBuilder,
    label: &str,
    value: &str,
    space_after: Option<u32>,
) -> Result<(), ExportError> {
    let props = ParagraphProps {
        space_after,
        ..Default::default()
    };
    paragraph(xml, props, &[(label, true), (value, false)])
}

fn heading(xml: &mut XmlBuilder, text: &str, space_before: u32) -> Result<(), ExportError> {
    paragraph(
        xml,
        ParagraphProps::styled("Heading1").before(space_before).after(200),
        &[(text, false)],
    )
}

/// Bold sub-label then one `- item` paragraph per entry.
fn item_group(
    xml: &mut XmlBuilder,
    label: &str,
    items: &[String],
    spaced: bool,
) -> Result<(), ExportError> {
    let props = if spaced {
        ParagraphProps::default().before(100)
    } else {
        ParagraphProps::default()
    };
    paragraph(xml, props, &[(label, true)])?;
    for item in items {
        paragraph(xml, ParagraphProps::default(), &[(format!("- {}", item).as_str(), false)])?;
    }
    Ok(())
}

fn procedure_table(xml: &mut XmlBuilder, plan: &LessonPlan) -> Result<(), ExportError> {
    xml.start("w:tbl", &[])?;

    xml.start("w:tblPr", &[])?;
    xml.empty("w:tblStyle", &[("w:val", "TableGrid")])?;
    xml.empty("w:tblW", &[("w:w", "5000"), ("w:type", "pct")])?;
    xml.start("w:tblBorders", &[])?;
    for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
        xml.empty(
            edge,
            &[
                ("w:val", "single"),
                ("w:sz", "4"),
                ("w:space", "0"),
                ("w:color", "auto"),
            ],
        )?;
    }
    xml.end("w:tblBorders")?;
    xml.end("w:tblPr")?;

    xml.start("w:tblGrid", &[])?;
    for width in COLUMN_WIDTHS {
        let width = width.to_string();
        xml.empty("w:gridCol", &[("w:w", width.as_str())])?;
    }
    xml.end("w:tblGrid")?;

    table_row(
        xml,
        [
            &["Các bước"][..],
            &["Hoạt động của cô"][..],
            &["Hoạt động của trẻ"][..],
        ],
        true,
    )?;

    for step in &plan.procedure {
        let step_lines = [step.step.as_str()];
        let teacher_lines: Vec<&str> = step.teacher_activity.split('\n').collect();
        let student_lines: Vec<&str> = step.student_activity.split('\n').collect();
        table_row(
            xml,
            [&step_lines[..], &teacher_lines[..], &student_lines[..]],
            false,
        )?;
    }

    xml.end("w:tbl")
}

fn table_row(xml: &mut XmlBuilder, cells: [&[&str]; 3], bold: bool) -> Result<(), ExportError> {
    xml.start("w:tr", &[])?;
    for (lines, width) in cells.iter().zip(COLUMN_WIDTHS) {
        xml.start("w:tc", &[])?;
        xml.start("w:tcPr", &[])?;
        let width = width.to_string();
        xml.empty("w:tcW", &[("w:w", width.as_str()), ("w:type", "dxa")])?;
        xml.end("w:tcPr")?;
        for line in lines.iter() {
            paragraph(xml, ParagraphProps::default(), &[(*line, bold)])?;
        }
        xml.end("w:tc")?;
    }
    xml.end("w:tr")
}

/// A4 portrait with one-inch margins.
fn section_properties(xml: &mut XmlBuilder) -> Result<(), ExportError> {
    xml.start("w:sectPr", &[])?;
    xml.empty("w:pgSz", &[("w:w", "11906"), ("w:h", "16838")])?;
    xml.empty(
        "w:pgMar",
        &[
            ("w:top", "1440"),
            ("w:right", "1440"),
            ("w:bottom", "1440"),
            ("w:left", "1440"),
            ("w:header", "708"),
            ("w:footer", "708"),
            ("w:gutter", "0"),
        ],
    )?;
    xml.end("w:sectPr")
}

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults>
<w:rPrDefault><w:rPr><w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman" w:cs="Times New Roman" w:eastAsia="Times New Roman"/><w:sz w:val="26"/><w:szCs w:val="26"/><w:lang w:val="vi-VN"/></w:rPr></w:rPrDefault>
<w:pPrDefault><w:pPr><w:spacing w:after="60" w:line="276" w:lineRule="auto"/></w:pPr></w:pPrDefault>
</w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:rPr><w:b/><w:sz w:val="48"/><w:szCs w:val="48"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:color w:val="065F46"/><w:sz w:val="30"/><w:szCs w:val="30"/></w:rPr></w:style>
<w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:tblPr><w:tblInd w:w="0" w:type="dxa"/><w:tblCellMar><w:top w:w="0" w:type="dxa"/><w:left w:w="108" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style>
<w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:basedOn w:val="TableNormal"/><w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tblBorders></w:tblPr></w:style>
</w:styles>
"#;

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════
