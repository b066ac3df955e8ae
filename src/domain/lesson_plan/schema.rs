//! Structured-output schema declared on every AI call.
//!
//! Uses the OpenAPI subset understood by Gemini's `responseSchema`
//! (upper-case type names).

use once_cell::sync::Lazy;
use serde_json::{json, Value};

static LESSON_PLAN_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let string_array = json!({ "type": "ARRAY", "items": { "type": "STRING" } });

    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "ageGroup": { "type": "STRING" },
            "method": { "type": "STRING" },
            "developmentField": { "type": "STRING" },
            "objectives": {
                "type": "OBJECT",
                "properties": {
                    "knowledge": string_array,
                    "skills": string_array,
                    "attitude": string_array
                }
            },
            "preparation": {
                "type": "OBJECT",
                "properties": {
                    "teacher": string_array,
                    "students": string_array
                }
            },
            "procedure": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "step": { "type": "STRING" },
                        "teacherActivity": { "type": "STRING" },
                        "studentActivity": { "type": "STRING" }
                    }
                }
            }
        }
    })
});

/// The lesson plan response schema.
pub fn lesson_plan_schema() -> &'static Value {
    &LESSON_PLAN_SCHEMA
}
