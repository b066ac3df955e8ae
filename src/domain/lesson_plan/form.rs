//! Lesson plan request form.
//!
//! `LessonPlanFormData` is the immutable snapshot of what the teacher typed at
//! submit time. The only rule enforced is that the topic is present.

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::errors::FormValidationError;

/// Age groups offered by the form, as `(value, label)` pairs.
pub const AGE_GROUPS: &[(&str, &str)] = &[
    ("Nhà trẻ (24-36 tháng)", "Nhà trẻ (24-36 tháng)"),
    ("Mầm (3-4 tuổi)", "Mầm (3-4 tuổi)"),
    ("Chồi (4-5 tuổi)", "Chồi (4-5 tuổi)"),
    ("Lá (5-6 tuổi)", "Lá (5-6 tuổi)"),
];

/// Teaching methods offered by the form.
pub const METHODS: &[(&str, &str)] = &[
    ("Truyền thống", "Truyền thống"),
    ("STEAM", "STEAM"),
    ("5E", "Mô hình 5E"),
    ("Montessori", "Montessori"),
    ("Reggio Emilia", "Reggio Emilia"),
];

/// Development fields offered by the form.
pub const DEVELOPMENT_FIELDS: &[(&str, &str)] = &[
    ("Phát triển thể chất", "Phát triển thể chất"),
    ("Phát triển nhận thức", "Phát triển nhận thức"),
    ("Phát triển ngôn ngữ", "Phát triển ngôn ngữ"),
    ("Phát triển TC-KNXH", "Phát triển TC-KNXH"),
    ("Phát triển thẩm mỹ", "Phát triển thẩm mỹ"),
];

/// Message shown next to the form when the topic is missing.
pub const MISSING_TOPIC_MESSAGE: &str = "Vui lòng nhập Chủ đề/Tên bài";

/// User input for a lesson plan.
///
/// Category fields are free strings; the option lists above are only hints for
/// the form. Every field tolerates being absent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LessonPlanFormData {
    pub topic: String,
    pub age_group: String,
    pub method: String,
    pub development_field: String,
    pub teacher: String,
    pub class_name: String,
    pub school: String,
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    pub location: String,
    pub notes: String,
}

impl Default for LessonPlanFormData {
    fn default() -> Self {
        Self {
            topic: String::new(),
            age_group: "Chồi (4-5 tuổi)".to_string(),
            method: "STEAM".to_string(),
            development_field: "Phát triển nhận thức".to_string(),
            teacher: String::new(),
            class_name: String::new(),
            school: String::new(),
            date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            location: String::new(),
            notes: String::new(),
        }
    }
}

impl LessonPlanFormData {
    /// Creates a form with defaults and the given topic.
    pub fn with_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Default::default()
        }
    }

    /// Checks the single submit rule: the topic must be non-empty.
    ///
    /// A whitespace-only topic counts as present, matching how the form has
    /// always behaved.
    pub fn validate(&self) -> Result<(), FormValidationError> {
        if self.topic.is_empty() {
            return Err(FormValidationError::MissingTopic);
        }
        Ok(())
    }
}
