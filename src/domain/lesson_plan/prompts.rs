//! Prompt construction for generation and revision.
//!
//! Both calls share one system instruction. Field values are embedded verbatim;
//! nothing is trimmed or escaped.

use super::form::LessonPlanFormData;
use super::plan::LessonPlan;

/// Domain rules sent as the system instruction on every call.
pub const SYSTEM_INSTRUCTION: &str = "Bạn là một Chuyên gia Tư vấn Giáo dục Mầm non cao cấp tại Việt Nam. \n\
Nhiệm vụ của bạn là soạn thảo giáo án chi tiết cho giáo viên mầm non.\n\
QUY TẮC NỘI DUNG:\n\
1. Ngôn ngữ tiếng Việt chuẩn sư phạm mầm non.\n\
2. Mục tiêu phải đo lường được.\n\
3. Tiến trình phải chi tiết, sáng tạo, lấy trẻ làm trung tâm.\n\
4. Tích hợp đúng phương pháp người dùng yêu cầu (STEAM, 5E, Montessori, v.v.).";

/// Builds the generation instruction from a submitted form.
pub fn generation_prompt(form: &LessonPlanFormData) -> String {
    format!(
        "Hãy soạn giáo án mầm non với thông tin sau:\n\
         - Chủ đề/Tên bài: {}\n\
         - Độ tuổi: {}\n\
         - Phương pháp: {}\n\
         - Lĩnh vực phát triển: {}\n\
         - Giáo viên: {}\n\
         - Lớp: {}\n\
         - Trường: {}\n\
         - Ngày dạy: {}\n\
         - Địa điểm (Xã/Thành phố): {}\n\
         - Ghi chú thêm: {}",
        form.topic,
        form.age_group,
        form.method,
        form.development_field,
        form.teacher,
        form.class_name,
        form.school,
        form.date,
        form.location,
        form.notes,
    )
}

/// Builds the revision instruction: the whole current plan plus the feedback.
pub fn revision_prompt(current: &LessonPlan, feedback: &str) -> String {
    format!(
        "Dưới đây là giáo án hiện tại:\n{}\n\n\
         Người dùng muốn điều chỉnh như sau: \"{}\"\n\n\
         Hãy cập nhật giáo án dựa trên yêu cầu trên và trả về định dạng JSON đầy đủ.",
        current.to_pretty_json(),
        feedback,
    )
}
