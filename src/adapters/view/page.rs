//! Full page renderer.
//!
//! Server-rendered form, error banner, plan region, revision box and export
//! links. Forms post back and are redirected to `/`, so the page is always a
//! pure function of the workspace snapshot.

use crate::application::WorkspaceSnapshot;
use crate::domain::lesson_plan::{AGE_GROUPS, DEVELOPMENT_FIELDS, METHODS};

use super::escape_html;
use super::plan_view::{render_plan_region, PLAN_CSS};

/// Renders the whole page for a snapshot.
pub fn render_page(snapshot: &WorkspaceSnapshot) -> String {
    let busy = snapshot.is_generating || snapshot.is_revising;
    // Busy pages poll so another tab sees the result land.
    let refresh = if busy {
        "<meta http-equiv=\"refresh\" content=\"3\">\n"
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="vi">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
{refresh}<title>EduGen | Giáo án Mầm non</title>
<style>
{page_css}
{plan_css}
</style>
</head>
<body>
<header class="topbar">
<h1>EduGen <span>| Giáo án Mầm non</span></h1>
<div class="badge">Powered by Gemini 3.1 Pro</div>
</header>
<main class="layout">
<section class="panel form-panel">
{form}
</section>
<section class="result">
{result}
</section>
</main>
</body>
</html>
"#,
        refresh = refresh,
        page_css = PAGE_CSS,
        plan_css = PLAN_CSS,
        form = render_form(snapshot),
        result = render_result(snapshot),
    )
}

fn render_form(snapshot: &WorkspaceSnapshot) -> String {
    let form = &snapshot.form;
    let mut out = String::new();

    out.push_str("<h2>Thông tin bài dạy</h2>\n");
    out.push_str("<form method=\"post\" action=\"/plan\">\n");
    out.push_str(&text_input(
        "topic",
        "Chủ đề / Tên bài <span class=\"required\">*</span>",
        &form.topic,
        "VD: Khám phá quả cam...",
    ));
    out.push_str("<div class=\"row\">\n");
    out.push_str(&select("ageGroup", "Độ tuổi", AGE_GROUPS, &form.age_group));
    out.push_str(&select("method", "Phương pháp", METHODS, &form.method));
    out.push_str("</div>\n");
    out.push_str(&select(
        "developmentField",
        "Lĩnh vực phát triển",
        DEVELOPMENT_FIELDS,
        &form.development_field,
    ));
    out.push_str("<div class=\"row\">\n");
    out.push_str(&text_input("teacher", "Giáo viên", &form.teacher, ""));
    out.push_str(&text_input("className", "Lớp", &form.class_name, ""));
    out.push_str("</div>\n<div class=\"row\">\n");
    out.push_str(&text_input("school", "Trường", &form.school, ""));
    out.push_str(&format!(
        "<label>Ngày dạy<input type=\"date\" name=\"date\" value=\"{}\"></label>\n",
        escape_html(&form.date)
    ));
    out.push_str("</div>\n");
    out.push_str(&text_input("location", "Địa điểm", &form.location, ""));
    out.push_str(&format!(
        "<label>Ghi chú thêm<textarea name=\"notes\" rows=\"3\" placeholder=\"Yêu cầu đặc biệt, vật liệu có sẵn...\">{}</textarea></label>\n",
        escape_html(&form.notes)
    ));

    if let Some(error) = &snapshot.error {
        out.push_str(&format!(
            "<div class=\"error-banner\" role=\"alert\"><p>{}</p><button type=\"submit\" formaction=\"/error/dismiss\" formnovalidate class=\"dismiss\" aria-label=\"Đóng\">×</button></div>\n",
            escape_html(error)
        ));
    }

    if snapshot.is_generating {
        out.push_str("<button type=\"submit\" class=\"primary\" disabled>Đang soạn giáo án...</button>\n");
    } else {
        out.push_str("<button type=\"submit\" class=\"primary\">Tạo giáo án</button>\n");
    }
    out.push_str("</form>\n");
    out
}

fn render_result(snapshot: &WorkspaceSnapshot) -> String {
    let Some(plan) = snapshot.plan.as_ref() else {
        return render_plan_region(None);
    };

    let mut out = String::new();
    out.push_str(
        "<nav class=\"exports\">\n\
         <a class=\"export pdf\" href=\"/plan/export/pdf\">Tải PDF</a>\n\
         <a class=\"export word\" href=\"/plan/export/docx\">Tải Word</a>\n\
         <a class=\"export slides\" href=\"/plan/export/pptx\">Giáo án điện tử (PPTX)</a>\n\
         <form method=\"post\" action=\"/plan/clear\"><button type=\"submit\" class=\"export clear\">Xóa giáo án</button></form>\n\
         </nav>\n",
    );
    out.push_str(&render_plan_region(Some(plan)));

    let revise_button = if snapshot.is_revising {
        "<button type=\"submit\" disabled>Đang cập nhật...</button>"
    } else {
        "<button type=\"submit\">Cập nhật</button>"
    };
    out.push_str(&format!(
        "<div class=\"panel feedback\">\n<h3>Tinh chỉnh giáo án</h3>\n\
         <form method=\"post\" action=\"/plan/revise\" class=\"feedback-row\">\n\
         <input type=\"text\" name=\"feedback\" value=\"{}\" required \
         placeholder=\"VD: Thêm trò chơi vận động ở phần kết thúc, làm rõ hơn phần khám phá...\">\n\
         {}\n</form>\n</div>\n",
        escape_html(&snapshot.feedback),
        revise_button
    ));
    out
}

fn text_input(name: &str, label: &str, value: &str, placeholder: &str) -> String {
    format!(
        "<label>{label}<input type=\"text\" name=\"{name}\" value=\"{value}\" placeholder=\"{placeholder}\"></label>\n",
        label = label,
        name = name,
        value = escape_html(value),
        placeholder = escape_html(placeholder),
    )
}

/// A select whose current value is kept even when it is not one of the options.
fn select(name: &str, label: &str, options: &[(&str, &str)], current: &str) -> String {
    let mut out = format!("<label>{}<select name=\"{}\">\n", label, name);
    let known = options.iter().any(|(value, _)| *value == current);
    if !known && !current.is_empty() {
        out.push_str(&format!(
            "<option value=\"{0}\" selected>{0}</option>\n",
            escape_html(current)
        ));
    }
    for (value, text) in options {
        let selected = if *value == current { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            escape_html(value),
            selected,
            escape_html(text)
        ));
    }
    out.push_str("</select></label>\n");
    out
}

const PAGE_CSS: &str = r#"
* { box-sizing: border-box; }
body {
    margin: 0;
    font-family: -apple-system, 'Segoe UI', Roboto, Arial, sans-serif;
    background: #fafaf9;
    color: #1c1917;
}
.topbar {
    display: flex;
    justify-content: space-between;
    align-items: center;
    padding: 12px 32px;
    background: #ffffff;
    border-bottom: 1px solid #e7e5e4;
}
.topbar h1 { font-size: 1.2rem; margin: 0; }
.topbar h1 span { color: #a8a29e; font-weight: normal; }
.badge { background: #f5f5f4; border-radius: 999px; padding: 6px 12px; font-size: 0.85rem; }
.layout {
    display: grid;
    grid-template-columns: minmax(280px, 1fr) 2fr;
    gap: 32px;
    max-width: 1280px;
    margin: 0 auto;
    padding: 32px;
}
.panel {
    background: #ffffff;
    border: 1px solid #e7e5e4;
    border-radius: 16px;
    padding: 24px;
}
.form-panel label { display: block; font-size: 0.875rem; font-weight: 500; margin-bottom: 12px; }
.form-panel input, .form-panel select, .form-panel textarea {
    display: block;
    width: 100%;
    margin-top: 4px;
    padding: 8px 12px;
    background: #fafaf9;
    border: 1px solid #e7e5e4;
    border-radius: 12px;
    font: inherit;
}
.row { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
.required { color: #ef4444; }
.error-banner {
    display: flex;
    justify-content: space-between;
    align-items: flex-start;
    padding: 12px;
    margin-bottom: 12px;
    background: #fef2f2;
    color: #b91c1c;
    border-radius: 12px;
    font-size: 0.875rem;
}
.error-banner p { margin: 0; }
.dismiss { background: none; border: none; color: inherit; cursor: pointer; font-size: 1rem; }
button.primary {
    width: 100%;
    padding: 12px;
    background: #059669;
    color: #ffffff;
    border: none;
    border-radius: 12px;
    font-weight: 500;
    cursor: pointer;
}
button:disabled { opacity: 0.7; cursor: not-allowed; }
.exports { display: flex; flex-wrap: wrap; gap: 8px; justify-content: flex-end; margin-bottom: 16px; }
.exports form { margin: 0; }
.export {
    display: inline-block;
    padding: 8px 16px;
    border-radius: 12px;
    font-size: 0.875rem;
    text-decoration: none;
    border: none;
    cursor: pointer;
}
.export.pdf { background: #ffe4e6; color: #be123c; }
.export.word { background: #dbeafe; color: #1d4ed8; }
.export.slides { background: #ffedd5; color: #c2410c; }
.export.clear { background: #f5f5f4; color: #44403c; }
.feedback { margin-top: 24px; }
.feedback-row { display: flex; gap: 12px; }
.feedback-row input { flex: 1; padding: 8px 16px; border: 1px solid #e7e5e4; border-radius: 12px; }
.feedback-row button { padding: 8px 24px; background: #292524; color: #ffffff; border: none; border-radius: 12px; }
.plan-empty {
    min-height: 400px;
    display: flex;
    flex-direction: column;
    align-items: center;
    justify-content: center;
    color: #a8a29e;
    border: 2px dashed #e7e5e4;
    border-radius: 16px;
}
.plan-empty-title { font-size: 1.1rem; font-weight: 500; color: #78716c; margin: 0; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lesson_plan::fixtures::orange_plan;
    use crate::domain::lesson_plan::LessonPlanFormData;

    fn snapshot() -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            form: LessonPlanFormData::default(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_page_shows_placeholder_and_defaults() {
        let page = render_page(&snapshot());

        assert!(page.contains("Chưa có giáo án nào"));
        assert!(page.contains("<option value=\"Chồi (4-5 tuổi)\" selected>"));
        assert!(page.contains("<option value=\"STEAM\" selected>"));
        assert!(page.contains("<option value=\"5E\">Mô hình 5E</option>"));
        assert!(page.contains("<option value=\"Phát triển nhận thức\" selected>"));
        assert!(!page.contains("/plan/export/"));
        assert!(!page.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn plan_page_shows_exports_and_feedback() {
        let page = render_page(&WorkspaceSnapshot {
            plan: Some(orange_plan()),
            feedback: "ngắn hơn".to_string(),
            ..snapshot()
        });

        assert!(page.contains("id=\"lesson-plan-content\""));
        assert!(page.contains("href=\"/plan/export/pdf\""));
        assert!(page.contains("href=\"/plan/export/docx\""));
        assert!(page.contains("href=\"/plan/export/pptx\""));
        assert!(page.contains("action=\"/plan/revise\""));
        assert!(page.contains("value=\"ngắn hơn\""));
        assert!(!page.contains("Chưa có giáo án nào"));
    }

    #[test]
    fn error_banner_is_escaped_and_dismissable() {
        let page = render_page(&WorkspaceSnapshot {
            error: Some("<b>lỗi</b>".to_string()),
            ..snapshot()
        });

        assert!(page.contains("role=\"alert\""));
        assert!(page.contains("&lt;b&gt;lỗi&lt;/b&gt;"));
        assert!(page.contains("formaction=\"/error/dismiss\""));
    }

    #[test]
    fn busy_generation_disables_submit() {
        let page = render_page(&WorkspaceSnapshot {
            is_generating: true,
            ..snapshot()
        });

        assert!(page.contains("disabled>Đang soạn giáo án...</button>"));
        assert!(page.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn busy_revision_disables_update() {
        let page = render_page(&WorkspaceSnapshot {
            plan: Some(orange_plan()),
            is_revising: true,
            ..snapshot()
        });

        assert!(page.contains("disabled>Đang cập nhật...</button>"));
    }

    #[test]
    fn form_is_prefilled_and_escaped() {
        let mut form = LessonPlanFormData::with_topic("Quả \"cam\"");
        form.notes = "</textarea>".to_string();
        form.method = "Phương pháp dự án".to_string();

        let page = render_page(&WorkspaceSnapshot {
            form,
            ..snapshot()
        });

        assert!(page.contains("value=\"Quả &quot;cam&quot;\""));
        assert!(page.contains("&lt;/textarea&gt;</textarea>"));
        assert!(page.contains("<option value=\"Phương pháp dự án\" selected>"));
    }
}
