//! Slide deck export.
//!
//! Layout is computed first as plain data (`build_slides`), in inches on a
//! 10 x 5.625 inch canvas, and only then serialized to PresentationML. One
//! title slide, one objectives slide, one preparation slide, then one slide
//! per procedure step.

use async_trait::async_trait;

use crate::domain::lesson_plan::LessonPlan;
use crate::ports::{ExportError, ExportFormat, ExportedDocument, PlanExporter};

use super::ooxml::{
    content_types_part, core_properties_part, relationships_part, Package, Relationship,
    XmlBuilder, CORE_PROPERTIES_CONTENT_TYPE, CORE_PROPERTIES_REL, OFFICE_DOCUMENT_REL,
};

pub const EMU_PER_INCH: f64 = 914_400.0;
pub const SLIDE_WIDTH_EMU: i64 = 9_144_000;
pub const SLIDE_HEIGHT_EMU: i64 = 5_143_500;

const TITLE_COLOR: &str = "363636";
const META_COLOR: &str = "666666";
const ACCENT_COLOR: &str = "059669";

/// Vertical offset between stacked single-line boxes.
const LINE_STEP: f64 = 0.3;

const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const P_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

const SLIDE_MASTER_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const SLIDE_LAYOUT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const SLIDE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const THEME_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

const PRESENTATION_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const SLIDE_MASTER_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const SLIDE_LAYOUT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const THEME_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.theme+xml";

// ════════════════════════════════════════════════════════════════════════════════
// Layout
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Top,
    Middle,
}

/// A positioned text box; coordinates are in inches.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub lines: Vec<String>,
    pub size_pt: u32,
    pub bold: bool,
    pub color: Option<&'static str>,
    pub align: Align,
    pub anchor: Anchor,
}

impl TextBox {
    pub fn new(text: impl Into<String>, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w,
            h,
            lines: vec![text.into()],
            size_pt: 18,
            bold: false,
            color: None,
            align: Align::Left,
            anchor: Anchor::Middle,
        }
    }

    /// One paragraph per `\n`-separated line, anchored to the top.
    pub fn multiline(text: &str, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
            anchor: Anchor::Top,
            ..Self::new(String::new(), x, y, w, h)
        }
    }

    pub fn with_size(mut self, size_pt: u32) -> Self {
        self.size_pt = size_pt;
        self
    }

    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_color(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_center(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    /// Joined text, for assertions and logs.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slide {
    pub boxes: Vec<TextBox>,
}

impl Slide {
    fn push(&mut self, text_box: TextBox) {
        self.boxes.push(text_box);
    }

    /// Slide opening with a green section heading.
    fn with_heading(text: impl Into<String>, size_pt: u32) -> Self {
        let mut slide = Self::default();
        slide.push(
            TextBox::new(text, 0.5, 0.5, 9.0, 0.5)
                .with_size(size_pt)
                .with_bold()
                .with_color(ACCENT_COLOR),
        );
        slide
    }

    /// Stacks labelled bullet groups downward from `y`.
    fn push_groups(&mut self, mut y: f64, groups: &[(&str, &[String])], gap: f64) {
        for (index, (label, items)) in groups.iter().enumerate() {
            if index > 0 {
                y += gap;
            }
            self.push(
                TextBox::new(*label, 0.5, y, 9.0, LINE_STEP)
                    .with_size(16)
                    .with_bold(),
            );
            y += LINE_STEP;
            for item in items.iter() {
                self.push(TextBox::new(format!("• {}", item), 0.8, y, 8.7, LINE_STEP).with_size(14));
                y += LINE_STEP;
            }
        }
    }
}

/// Lays out the whole deck.
pub fn build_slides(plan: &LessonPlan) -> Vec<Slide> {
    let mut slides = Vec::with_capacity(3 + plan.step_count());

    let mut title = Slide::default();
    title.push(
        TextBox::new(plan.title.clone(), 1.0, 1.5, 8.0, 1.0)
            .with_size(36)
            .with_bold()
            .with_center()
            .with_color(TITLE_COLOR),
    );
    let meta = [
        format!("Lĩnh vực: {}", plan.development_field),
        format!("Độ tuổi: {}", plan.age_group),
        format!("Phương pháp: {}", plan.method),
    ];
    for (line, y) in meta.into_iter().zip([3.0, 3.5, 4.0]) {
        title.push(
            TextBox::new(line, 1.0, y, 8.0, 0.5)
                .with_size(18)
                .with_center()
                .with_color(META_COLOR),
        );
    }
    slides.push(title);

    let mut objectives = Slide::with_heading("I. Mục đích - Yêu cầu", 24);
    objectives.push_groups(
        1.2,
        &[
            ("1. Kiến thức:", plan.objectives.knowledge.as_slice()),
            ("2. Kỹ năng:", plan.objectives.skills.as_slice()),
            ("3. Thái độ:", plan.objectives.attitude.as_slice()),
        ],
        0.2,
    );
    slides.push(objectives);

    let mut preparation = Slide::with_heading("II. Chuẩn bị", 24);
    preparation.push_groups(
        1.2,
        &[
            ("1. Đồ dùng của cô:", plan.preparation.teacher.as_slice()),
            ("2. Đồ dùng của trẻ:", plan.preparation.students.as_slice()),
        ],
        LINE_STEP,
    );
    slides.push(preparation);

    for (index, step) in plan.procedure.iter().enumerate() {
        let mut slide = Slide::with_heading(
            format!("III. Tiến trình - Bước {}: {}", index + 1, step.step),
            20,
        );
        for (label, text, x) in [
            ("Hoạt động của cô:", &step.teacher_activity, 0.5),
            ("Hoạt động của trẻ:", &step.student_activity, 5.25),
        ] {
            slide.push(
                TextBox::new(label, x, 1.2, 4.25, LINE_STEP)
                    .with_size(16)
                    .with_bold()
                    .with_color(TITLE_COLOR),
            );
            slide.push(TextBox::multiline(text, x, 1.6, 4.25, 3.5).with_size(14));
        }
        slides.push(slide);
    }

    slides
}

/// Inches to English Metric Units.
pub fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

// ════════════════════════════════════════════════════════════════════════════════
// Exporter
// ════════════════════════════════════════════════════════════════════════════════

/// PowerPoint (.pptx) exporter.
#[derive(Debug, Clone, Default)]
pub struct PptxExporter;

impl PptxExporter {
    pub fn new() -> Self {
        Self
    }

    /// Builds the complete `.pptx` package.
    pub fn render(plan: &LessonPlan) -> Result<Vec<u8>, ExportError> {
        let slides = build_slides(plan);
        let mut package = Package::new();

        let mut overrides = vec![
            ("/ppt/presentation.xml".to_string(), PRESENTATION_CONTENT_TYPE),
            (
                "/ppt/slideMasters/slideMaster1.xml".to_string(),
                SLIDE_MASTER_CONTENT_TYPE,
            ),
            (
                "/ppt/slideLayouts/slideLayout1.xml".to_string(),
                SLIDE_LAYOUT_CONTENT_TYPE,
            ),
            ("/ppt/theme/theme1.xml".to_string(), THEME_CONTENT_TYPE),
            ("/docProps/core.xml".to_string(), CORE_PROPERTIES_CONTENT_TYPE),
        ];
        for number in 1..=slides.len() {
            overrides.push((
                format!("/ppt/slides/slide{}.xml", number),
                SLIDE_CONTENT_TYPE,
            ));
        }

        package.add("[Content_Types].xml", &content_types_part(&overrides)?)?;
        package.add(
            "_rels/.rels",
            &relationships_part(&[
                Relationship {
                    id: "rId1".to_string(),
                    rel_type: OFFICE_DOCUMENT_REL,
                    target: "ppt/presentation.xml".to_string(),
                },
                Relationship {
                    id: "rId2".to_string(),
                    rel_type: CORE_PROPERTIES_REL,
                    target: "docProps/core.xml".to_string(),
                },
            ])?,
        )?;
        package.add("docProps/core.xml", &core_properties_part(&plan.title)?)?;

        package.add("ppt/presentation.xml", &presentation_part(slides.len())?)?;
        package.add(
            "ppt/_rels/presentation.xml.rels",
            &presentation_rels(slides.len())?,
        )?;

        package.add("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER_XML.as_bytes())?;
        package.add(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            &relationships_part(&[
                rel(1, SLIDE_LAYOUT_REL, "../slideLayouts/slideLayout1.xml"),
                rel(2, THEME_REL, "../theme/theme1.xml"),
            ])?,
        )?;
        package.add("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT_XML.as_bytes())?;
        package.add(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            &relationships_part(&[rel(1, SLIDE_MASTER_REL, "../slideMasters/slideMaster1.xml")])?,
        )?;
        package.add("ppt/theme/theme1.xml", THEME_XML.as_bytes())?;

        let layout_rels =
            relationships_part(&[rel(1, SLIDE_LAYOUT_REL, "../slideLayouts/slideLayout1.xml")])?;
        for (index, slide) in slides.iter().enumerate() {
            let number = index + 1;
            package.add(&format!("ppt/slides/slide{}.xml", number), &slide_part(slide)?)?;
            package.add(
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                &layout_rels,
            )?;
        }

        package.finish()
    }
}

#[async_trait]
impl PlanExporter for PptxExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pptx
    }

    async fn export(&self, plan: &LessonPlan) -> Result<ExportedDocument, ExportError> {
        let content = Self::render(plan)?;
        Ok(ExportedDocument::new(content, ExportFormat::Pptx, &plan.title))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// PresentationML parts
// ════════════════════════════════════════════════════════════════════════════════

fn rel(id: usize, rel_type: &'static str, target: &str) -> Relationship<'static> {
    Relationship {
        id: format!("rId{}", id),
        rel_type,
        target: target.to_string(),
    }
}

/// rId1 is the master, rId2 the theme, slides follow from rId3.
fn presentation_rels(slide_count: usize) -> Result<Vec<u8>, ExportError> {
    let mut rels = vec![
        rel(1, SLIDE_MASTER_REL, "slideMasters/slideMaster1.xml"),
        rel(2, THEME_REL, "theme/theme1.xml"),
    ];
    for number in 1..=slide_count {
        rels.push(rel(number + 2, SLIDE_REL, &format!("slides/slide{}.xml", number)));
    }
    relationships_part(&rels)
}

fn presentation_part(slide_count: usize) -> Result<Vec<u8>, ExportError> {
    let mut xml = XmlBuilder::new()?;
    xml.start(
        "p:presentation",
        &[
            ("xmlns:a", A_NS),
            ("xmlns:r", R_NS),
            ("xmlns:p", P_NS),
            ("saveSubsetFonts", "1"),
        ],
    )?;

    xml.start("p:sldMasterIdLst", &[])?;
    xml.empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
    xml.end("p:sldMasterIdLst")?;

    xml.start("p:sldIdLst", &[])?;
    for index in 0..slide_count {
        let id = (256 + index).to_string();
        let rel_id = format!("rId{}", index + 3);
        xml.empty("p:sldId", &[("id", id.as_str()), ("r:id", rel_id.as_str())])?;
    }
    xml.end("p:sldIdLst")?;

    let cx = SLIDE_WIDTH_EMU.to_string();
    let cy = SLIDE_HEIGHT_EMU.to_string();
    xml.empty("p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    xml.empty("p:notesSz", &[("cx", "6858000"), ("cy", "9144000")])?;

    xml.end("p:presentation")?;
    Ok(xml.finish())
}

fn slide_part(slide: &Slide) -> Result<Vec<u8>, ExportError> {
    let mut xml = XmlBuilder::new()?;
    xml.start(
        "p:sld",
        &[("xmlns:a", A_NS), ("xmlns:r", R_NS), ("xmlns:p", P_NS)],
    )?;
    xml.start("p:cSld", &[])?;
    xml.start("p:spTree", &[])?;
    group_shape_header(&mut xml)?;

    for (index, text_box) in slide.boxes.iter().enumerate() {
        shape(&mut xml, index + 2, text_box)?;
    }

    xml.end("p:spTree")?;
    xml.end("p:cSld")?;
    xml.start("p:clrMapOvr", &[])?;
    xml.empty("a:masterClrMapping", &[])?;
    xml.end("p:clrMapOvr")?;
    xml.end("p:sld")?;
    Ok(xml.finish())
}

fn group_shape_header(xml: &mut XmlBuilder) -> Result<(), ExportError> {
    xml.start("p:nvGrpSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    xml.empty("p:cNvGrpSpPr", &[])?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvGrpSpPr")?;

    xml.start("p:grpSpPr", &[])?;
    xml.start("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:ext", &[("cx", "0"), ("cy", "0")])?;
    xml.empty("a:chOff", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:chExt", &[("cx", "0"), ("cy", "0")])?;
    xml.end("a:xfrm")?;
    xml.end("p:grpSpPr")
}

fn shape(xml: &mut XmlBuilder, id: usize, text_box: &TextBox) -> Result<(), ExportError> {
    let id_str = id.to_string();
    let name = format!("Text {}", id - 1);
    let (x, y) = (emu(text_box.x).to_string(), emu(text_box.y).to_string());
    let (cx, cy) = (emu(text_box.w).to_string(), emu(text_box.h).to_string());

    xml.start("p:sp", &[])?;

    xml.start("p:nvSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", id_str.as_str()), ("name", name.as_str())])?;
    xml.empty("p:cNvSpPr", &[("txBox", "1")])?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvSpPr")?;

    xml.start("p:spPr", &[])?;
    xml.start("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", x.as_str()), ("y", y.as_str())])?;
    xml.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    xml.end("a:xfrm")?;
    xml.start("a:prstGeom", &[("prst", "rect")])?;
    xml.empty("a:avLst", &[])?;
    xml.end("a:prstGeom")?;
    xml.empty("a:noFill", &[])?;
    xml.end("p:spPr")?;

    xml.start("p:txBody", &[])?;
    let anchor = match text_box.anchor {
        Anchor::Top => "t",
        Anchor::Middle => "ctr",
    };
    xml.empty(
        "a:bodyPr",
        &[
            ("wrap", "square"),
            ("lIns", "91440"),
            ("tIns", "45720"),
            ("rIns", "91440"),
            ("bIns", "45720"),
            ("rtlCol", "0"),
            ("anchor", anchor),
        ],
    )?;
    xml.empty("a:lstStyle", &[])?;
    for line in &text_box.lines {
        text_paragraph(xml, text_box, line)?;
    }
    xml.end("p:txBody")?;

    xml.end("p:sp")
}

fn text_paragraph(xml: &mut XmlBuilder, text_box: &TextBox, line: &str) -> Result<(), ExportError> {
    let size = (text_box.size_pt * 100).to_string();
    let align = match text_box.align {
        Align::Left => "l",
        Align::Center => "ctr",
    };

    xml.start("a:p", &[])?;
    xml.empty("a:pPr", &[("algn", align)])?;

    if line.is_empty() {
        xml.empty("a:endParaRPr", &[("lang", "vi-VN"), ("sz", size.as_str())])?;
        return xml.end("a:p");
    }

    xml.start("a:r", &[])?;
    let mut attrs = vec![("lang", "vi-VN"), ("sz", size.as_str())];
    if text_box.bold {
        attrs.push(("b", "1"));
    }
    attrs.push(("dirty", "0"));
    match text_box.color {
        Some(color) => {
            xml.start("a:rPr", &attrs)?;
            xml.start("a:solidFill", &[])?;
            xml.empty("a:srgbClr", &[("val", color)])?;
            xml.end("a:solidFill")?;
            xml.end("a:rPr")?;
        }
        None => xml.empty("a:rPr", &attrs)?,
    }
    xml.text_element("a:t", &[], line)?;
    xml.end("a:r")?;

    xml.end("a:p")
}

const SLIDE_MASTER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld>
<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>
</p:sldMaster>
"#;

const SLIDE_LAYOUT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1">
<p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>
"#;

const THEME_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="EduGen">
<a:themeElements>
<a:clrScheme name="EduGen">
<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
<a:dk2><a:srgbClr val="363636"/></a:dk2>
<a:lt2><a:srgbClr val="F5F5F4"/></a:lt2>
<a:accent1><a:srgbClr val="059669"/></a:accent1>
<a:accent2><a:srgbClr val="0EA5E9"/></a:accent2>
<a:accent3><a:srgbClr val="F59E0B"/></a:accent3>
<a:accent4><a:srgbClr val="EF4444"/></a:accent4>
<a:accent5><a:srgbClr val="8B5CF6"/></a:accent5>
<a:accent6><a:srgbClr val="EC4899"/></a:accent6>
<a:hlink><a:srgbClr val="0563C1"/></a:hlink>
<a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
</a:clrScheme>
<a:fontScheme name="EduGen">
<a:majorFont><a:latin typeface="Arial"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>
<a:minorFont><a:latin typeface="Arial"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>
</a:fontScheme>
<a:fmtScheme name="EduGen">
<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst>
<a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>
<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>
<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst>
</a:fmtScheme>
</a:themeElements>
<a:objectDefaults/>
<a:extraClrSchemeLst/>
</a:theme>
"#;

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════
