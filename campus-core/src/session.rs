use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CampusError;
use crate::tenant::TenantContext;

/// The closed set of roles. Anything else fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    SchoolAdmin,
    Teacher,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::SuperAdmin, Role::SchoolAdmin, Role::Teacher];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::SchoolAdmin => "school_admin",
            Role::Teacher => "teacher",
        }
    }

    /// Human label shown in the dashboard chrome.
    pub fn label(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::SchoolAdmin => "School Admin",
            Role::Teacher => "Teacher",
        }
    }

    /// Roles other than super admin only make sense inside one school.
    pub fn is_school_scoped(&self) -> bool {
        !matches!(self, Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CampusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "super_admin" => Ok(Role::SuperAdmin),
            "school_admin" => Ok(Role::SchoolAdmin),
            "teacher" => Ok(Role::Teacher),
            other => Err(CampusError::forbidden(format!("Unknown role: {other}"))),
        }
    }
}

/// The authenticated caller.
///
/// Built by the auth gateway at sign-in and handed explicitly to whatever
/// needs it; nothing reads it from global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    /// `None` only for super admins.
    pub school_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl Session {
    /// Tenant scope of this session, if it has one.
    pub fn tenant(&self) -> Option<TenantContext> {
        self.school_id.as_deref().map(TenantContext::new)
    }

    /// Tenant scope, or `Forbidden` for sessions that are not bound to a school.
    pub fn require_tenant(&self) -> Result<TenantContext, CampusError> {
        self.tenant()
            .ok_or_else(|| CampusError::forbidden("This account is not linked to a school"))
    }

    pub fn has_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}
