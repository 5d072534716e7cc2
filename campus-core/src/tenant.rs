//! Core multi-tenant types for Campus.

use std::fmt;

/// A tenant is one school; its id is the school's row id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(pub String);

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Context carried into every school-scoped panel call.
///
/// It is only ever built from a verified [`crate::Session`], never from
/// client-supplied ids, so every scoped query filters by the caller's own
/// school.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: TenantId,
}

impl TenantContext {
    pub fn new<S: Into<String>>(tenant: S) -> Self {
        Self {
            tenant_id: TenantId(tenant.into()),
        }
    }

    pub fn school_id(&self) -> &str {
        &self.tenant_id.0
    }
}
