use campus_core::validate::not_blank;
use campus_core::SchoolType;
use serde::Deserialize;
use validator::Validate;

pub const SCHEMA_ERROR: &str = "Sign-up validation failed";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpForm {
    #[validate(custom(function = "not_blank", message = "School name is required"))]
    pub school_name: String,
    #[serde(default)]
    pub school_type: Option<SchoolType>,
    #[serde(default)]
    pub school_email: Option<String>,
    #[serde(default)]
    pub school_address: Option<String>,
    #[validate(custom(function = "not_blank", message = "Your full name is required"))]
    pub admin_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub admin_email: String,
    #[serde(default)]
    pub admin_phone: Option<String>,
    pub password: String,
}
