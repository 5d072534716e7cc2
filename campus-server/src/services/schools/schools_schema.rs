use campus_core::validate::not_blank;
use campus_core::SchoolType;
use serde::Deserialize;
use validator::Validate;

pub const SCHEMA_ERROR: &str = "School validation failed";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSchool {
    #[validate(custom(function = "not_blank", message = "School name is required"))]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub school_type: Option<SchoolType>,
}
