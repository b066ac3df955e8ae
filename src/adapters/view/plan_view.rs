//! Lesson plan presentation.
//!
//! The plan is first written as a Markdown outline, then converted to HTML
//! with pulldown-cmark. All plan text is backslash-escaped before it enters
//! the Markdown, so model output can never inject structure or markup. The
//! only raw HTML in the outline is the `<br>` used for line breaks inside
//! procedure table cells.

use pulldown_cmark::{html, Options, Parser};

use crate::domain::lesson_plan::LessonPlan;

use super::escape_html;

/// `id` of the element wrapping the rendered plan.
pub const PLAN_REGION_ID: &str = "lesson-plan-content";

pub const EMPTY_TITLE: &str = "Chưa có giáo án nào";
pub const EMPTY_HINT: &str = "Điền thông tin bên trái và nhấn \"Tạo giáo án\" để bắt đầu";

/// Writes the plan as a Markdown document.
pub fn render_markdown(plan: &LessonPlan) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", inline(&plan.title)));
    md.push_str(&format!(
        "**Lĩnh vực:** {}  \n**Độ tuổi:** {}  \n**Phương pháp:** {}\n\n",
        inline(&plan.development_field),
        inline(&plan.age_group),
        inline(&plan.method),
    ));

    md.push_str("## I. Mục đích - Yêu cầu\n\n");
    push_list(&mut md, "1. Kiến thức", &plan.objectives.knowledge);
    push_list(&mut md, "2. Kỹ năng", &plan.objectives.skills);
    push_list(&mut md, "3. Thái độ", &plan.objectives.attitude);

    md.push_str("## II. Chuẩn bị\n\n");
    push_list(&mut md, "1. Đồ dùng của cô", &plan.preparation.teacher);
    push_list(&mut md, "2. Đồ dùng của trẻ", &plan.preparation.students);

    md.push_str("## III. Tiến trình hoạt động\n\n");
    md.push_str("| Các bước | Hoạt động của cô | Hoạt động của trẻ |\n");
    md.push_str("| --- | --- | --- |\n");
    for step in &plan.procedure {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            table_cell(&step.step),
            table_cell(&step.teacher_activity),
            table_cell(&step.student_activity),
        ));
    }

    md
}

/// Converts the plan outline to an HTML fragment.
pub fn render_plan_body(plan: &LessonPlan) -> String {
    let markdown = render_markdown(plan);
    let parser = Parser::new_ext(&markdown, Options::ENABLE_TABLES);

    let mut body = String::new();
    html::push_html(&mut body, parser);
    body
}

/// Renders the plan region, or the placeholder when there is no plan.
pub fn render_plan_region(plan: Option<&LessonPlan>) -> String {
    match plan {
        Some(plan) => format!(
            "<article id=\"{}\" class=\"lesson-plan\">\n{}</article>\n",
            PLAN_REGION_ID,
            render_plan_body(plan)
        ),
        None => format!(
            "<div class=\"plan-empty\">\n<p class=\"plan-empty-title\">{}</p>\n<p>{}</p>\n</div>\n",
            EMPTY_TITLE,
            escape_html(EMPTY_HINT)
        ),
    }
}

/// Renders the plan region as a standalone, printable HTML document.
pub fn render_standalone_document(plan: &LessonPlan) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="vi">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
{css}
</style>
</head>
<body>
{region}</body>
</html>
"#,
        title = escape_html(&plan.title),
        css = PLAN_CSS,
        region = render_plan_region(Some(plan)),
    )
}

fn push_list(md: &mut String, heading: &str, items: &[String]) {
    md.push_str(&format!("### {}\n\n", heading));
    for item in items {
        md.push_str(&format!("- {}\n", inline(item)));
    }
    md.push('\n');
}

/// Single-line Markdown text: line breaks become spaces, then escaped.
fn inline(text: &str) -> String {
    escape_markdown(&text.replace(|c: char| c == '\n' || c == '\r', " "))
}

fn table_cell(text: &str) -> String {
    text.lines()
        .map(escape_markdown)
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Backslash-escapes every ASCII punctuation character.
pub(crate) fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_ascii_punctuation() {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Styles shared by the page and the PDF snapshot.
pub const PLAN_CSS: &str = r#"
.lesson-plan {
    font-family: 'Times New Roman', Georgia, serif;
    color: #1c1917;
    background: #ffffff;
    border: 1px solid #e7e5e4;
    border-radius: 16px;
    padding: 24px;
}

.lesson-plan h1 {
    text-align: center;
    font-size: 1.6rem;
    margin: 0 0 8px;
}

.lesson-plan h1 + p {
    text-align: center;
    color: #57534e;
    font-size: 0.9rem;
}

.lesson-plan h2 {
    color: #065f46;
    font-size: 1.15rem;
    margin-top: 28px;
}

.lesson-plan h3 {
    font-size: 1rem;
    margin-bottom: 6px;
}

.lesson-plan ul {
    margin: 0 0 12px;
    padding-left: 1.5em;
}

.lesson-plan table {
    width: 100%;
    border-collapse: collapse;
    font-size: 0.9rem;
}

.lesson-plan th,
.lesson-plan td {
    border: 1px solid #e7e5e4;
    padding: 8px;
    text-align: left;
    vertical-align: top;
}

.lesson-plan th {
    background: #f5f5f4;
}

.lesson-plan th:nth-child(1) { width: 25%; }
.lesson-plan th:nth-child(2) { width: 50%; }
.lesson-plan th:nth-child(3) { width: 25%; }

@media print {
    .lesson-plan { border: none; padding: 0; }
    .lesson-plan table { page-break-inside: auto; }
    .lesson-plan tr { page-break-inside: avoid; }
}
"#;

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lesson_plan::fixtures::orange_plan;
    use crate::domain::lesson_plan::{Objectives, Preparation};

    #[test]
    fn markdown_has_three_sections_in_order() {
        let md = render_markdown(&orange_plan());

        let first = md.find("## I. Mục đích - Yêu cầu").unwrap();
        let second = md.find("## II. Chuẩn bị").unwrap();
        let third = md.find("## III. Tiến trình hoạt động").unwrap();
        assert!(first < second && second < third);
        assert!(md.starts_with("# Khám phá quả cam\n"));
    }

    #[test]
    fn html_contains_header_badges_and_lists() {
        let html = render_plan_body(&orange_plan());

        assert!(html.contains("<h1>Khám phá quả cam</h1>"));
        assert!(html.contains("<strong>Lĩnh vực:</strong> Phát triển nhận thức"));
        assert!(html.contains("<strong>Độ tuổi:</strong> Chồi (4-5 tuổi)"));
        assert!(html.contains("<strong>Phương pháp:</strong> STEAM"));
        assert!(html.contains("<h3>1. Kiến thức</h3>"));
        assert!(html.contains("<li>Trẻ biết quả cam có nhiều vitamin C</li>"));
        assert!(html.contains("<h3>2. Đồ dùng của trẻ</h3>"));
    }

    #[test]
    fn procedure_renders_as_table_with_line_breaks() {
        let html = render_plan_body(&orange_plan());

        assert!(html.contains("<table>"));
        assert!(html.contains("<th>Các bước</th>"));
        assert!(html.contains("<th>Hoạt động của cô</th>"));
        assert!(html.contains("<th>Hoạt động của trẻ</th>"));
        assert!(html.contains("Trẻ quan sát<br>Trẻ trả lời câu hỏi"));
        assert_eq!(html.matches("<tr>").count(), 3);
    }

    #[test]
    fn model_text_cannot_inject_markup() {
        let mut plan = orange_plan();
        plan.title = "<script>alert(1)</script>".to_string();
        plan.objectives.knowledge = vec!["**bold** | pipe".to_string()];
        plan.procedure[0].step = "a | b".to_string();

        let html = render_plan_body(&plan);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<li>**bold** | pipe</li>"));
        assert!(html.contains("<td>a | b</td>"));
    }

    #[test]
    fn empty_arrays_render_without_error() {
        let plan = LessonPlan {
            title: "Trống".to_string(),
            objectives: Objectives::default(),
            preparation: Preparation::default(),
            procedure: vec![],
            ..orange_plan()
        };

        let html = render_plan_body(&plan);

        assert!(html.contains("<h3>3. Thái độ</h3>"));
        assert!(!html.contains("<li>"));
        assert!(html.contains("<th>Các bước</th>"));
    }

    #[test]
    fn region_carries_id_or_placeholder() {
        let region = render_plan_region(Some(&orange_plan()));
        assert!(region.starts_with("<article id=\"lesson-plan-content\""));

        let empty = render_plan_region(None);
        assert!(empty.contains("Chưa có giáo án nào"));
        assert!(empty.contains("Tạo giáo án"));
        assert!(!empty.contains(PLAN_REGION_ID));
    }

    #[test]
    fn standalone_document_is_complete_html() {
        let doc = render_standalone_document(&orange_plan());

        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<meta charset=\"UTF-8\">"));
        assert!(doc.contains("<title>Khám phá quả cam</title>"));
        assert!(doc.contains(".lesson-plan table"));
        assert!(doc.contains("id=\"lesson-plan-content\""));
    }

    #[test]
    fn multi_line_header_text_stays_on_one_line() {
        let mut plan = orange_plan();
        plan.title = "Dòng 1\nDòng 2".to_string();
        plan.method = "STEAM\r\n\r\n5E".to_string();

        let html = render_plan_body(&plan);

        assert!(html.contains("<h1>Dòng 1 Dòng 2</h1>"));
        assert!(!html.contains("<p>Dòng 2</p>"));
        assert!(html.contains("STEAM"));
        assert!(!html.contains("<p>5E</p>"));
    }

    #[test]
    fn escape_markdown_escapes_punctuation_only() {
        assert_eq!(escape_markdown("1. Cô & trẻ"), "1\\. Cô \\& trẻ");
        assert_eq!(escape_markdown("  Quả cam  "), "Quả cam");
    }
}
