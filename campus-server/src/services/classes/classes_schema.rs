use campus_core::validate::not_blank;
use serde::Deserialize;
use validator::Validate;

pub const SCHEMA_ERROR: &str = "Class validation failed";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClass {
    #[validate(custom(function = "not_blank", message = "Class name is required"))]
    pub name: String,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
}
