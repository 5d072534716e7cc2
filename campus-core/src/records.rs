//! Row types for the tables Campus reads and writes.
//!
//! Field names follow the table columns (`snake_case`), so a row fetched
//! from any [`crate::TableBackend`] deserializes directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolType {
    Primary,
    Secondary,
    High,
    College,
}

impl SchoolType {
    pub const ALL: [SchoolType; 4] = [
        SchoolType::Primary,
        SchoolType::Secondary,
        SchoolType::High,
        SchoolType::College,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SchoolType::Primary => "Primary School",
            SchoolType::Secondary => "Secondary School",
            SchoolType::High => "High School",
            SchoolType::College => "College",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub school_code: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub school_type: Option<SchoolType>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub id: String,
    pub school_id: String,
    pub name: String,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: String,
    pub school_id: String,
    pub full_name: String,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Row in `user_roles`: which role a user holds, and in which school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub id: String,
    pub user_id: String,
    pub role: Role,
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
