//! The structured lesson plan record.
//!
//! A `LessonPlan` is always whole. Generation creates one and every revision
//! replaces it with a brand-new record; nothing here supports partial updates.

use serde::{Deserialize, Serialize};

use super::errors::PlanError;

/// Learning objectives, split by domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objectives {
    pub knowledge: Vec<String>,
    pub skills: Vec<String>,
    pub attitude: Vec<String>,
}

/// Materials prepared before the lesson.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preparation {
    pub teacher: Vec<String>,
    pub students: Vec<String>,
}

/// One row of the procedure table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureStep {
    pub step: String,
    pub teacher_activity: String,
    pub student_activity: String,
}

impl ProcedureStep {
    pub fn new(
        step: impl Into<String>,
        teacher_activity: impl Into<String>,
        student_activity: impl Into<String>,
    ) -> Self {
        Self {
            step: step.into(),
            teacher_activity: teacher_activity.into(),
            student_activity: student_activity.into(),
        }
    }
}

/// A complete lesson plan as returned by the AI service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlan {
    pub title: String,
    pub age_group: String,
    pub method: String,
    pub development_field: String,
    pub objectives: Objectives,
    pub preparation: Preparation,
    pub procedure: Vec<ProcedureStep>,
}

impl LessonPlan {
    /// Parses the structured text returned by the AI service.
    ///
    /// Typed deserialization is the only check: missing fields or wrong types
    /// are parse errors, unknown fields are ignored.
    pub fn from_model_text(text: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes the plan as 2-space indented JSON for revision prompts.
    pub fn to_pretty_json(&self) -> String {
        // Plain structs of strings always serialize.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Number of procedure steps.
    pub fn step_count(&self) -> usize {
        self.procedure.len()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn parses_camel_case_model_output() {
        let text = r#"{
            "title": "Bé tìm hiểu về nước",
            "ageGroup": "Lá (5-6 tuổi)",
            "method": "5E",
            "developmentField": "Phát triển nhận thức",
            "objectives": {"knowledge": ["a"], "skills": ["b"], "attitude": ["c"]},
            "preparation": {"teacher": ["x"], "students": []},
            "procedure": [
                {"step": "1", "teacherActivity": "t", "studentActivity": "s"}
            ]
        }"#;

        let plan = LessonPlan::from_model_text(text).unwrap();

        assert_eq!(plan.title, "Bé tìm hiểu về nước");
        assert_eq!(plan.age_group, "Lá (5-6 tuổi)");
        assert_eq!(plan.objectives.knowledge, vec!["a"]);
        assert!(plan.preparation.students.is_empty());
        assert_eq!(plan.procedure[0].teacher_activity, "t");
    }

    #[test]
    fn ignores_unknown_fields() {
        let mut value: serde_json::Value = serde_json::from_str(&orange_plan_json()).unwrap();
        value["extra"] = serde_json::json!("ignored");

        let plan = LessonPlan::from_model_text(&value.to_string()).unwrap();
        assert_eq!(plan, orange_plan());
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        let err = LessonPlan::from_model_text("```json\n{").unwrap_err();
        assert!(matches!(err, PlanError::Parse(_)));
    }

    #[test]
    fn missing_nested_field_is_a_parse_error() {
        let mut value: serde_json::Value = serde_json::from_str(&orange_plan_json()).unwrap();
        value["objectives"]
            .as_object_mut()
            .unwrap()
            .remove("attitude");

        let err = LessonPlan::from_model_text(&value.to_string()).unwrap_err();
        assert!(matches!(err, PlanError::Parse(_)));
    }

    #[test]
    fn pretty_json_uses_wire_names_and_two_space_indent() {
        let json = orange_plan().to_pretty_json();
        assert!(json.contains("\n  \"ageGroup\": \"Chồi (4-5 tuổi)\""));
        assert!(json.contains("\"teacherActivity\""));
        assert!(json.contains("\"developmentField\""));
    }

    #[test]
    fn step_count_reflects_procedure() {
        assert_eq!(orange_plan().step_count(), 2);
        assert_eq!(LessonPlan::default().step_count(), 0);
    }
}
