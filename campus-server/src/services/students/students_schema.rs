use campus_core::validate::not_blank;
use serde::Deserialize;
use validator::Validate;

pub const SCHEMA_ERROR: &str = "Student validation failed";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStudent {
    #[validate(custom(function = "not_blank", message = "Full name is required"))]
    pub full_name: String,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}
