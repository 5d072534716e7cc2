//! Role -> dashboard mapping.

use serde::Serialize;

use crate::session::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dashboard {
    SuperAdmin,
    SchoolAdmin,
    Teacher,
}

/// Exhaustive; there is no fallback view.
pub fn dispatch(role: Role) -> Dashboard {
    match role {
        Role::SuperAdmin => Dashboard::SuperAdmin,
        Role::SchoolAdmin => Dashboard::SchoolAdmin,
        Role::Teacher => Dashboard::Teacher,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub to: &'static str,
    pub label: &'static str,
}

// Paths are pinned to the route table by the tests below.
static SUPER_ADMIN_NAV: [NavLink; 3] = [
    NavLink { to: "/dashboard", label: "Dashboard" },
    NavLink { to: "/dashboard/schools", label: "Schools" },
    NavLink { to: "/dashboard/analytics", label: "Analytics" },
];

static SCHOOL_ADMIN_NAV: [NavLink; 4] = [
    NavLink { to: "/dashboard", label: "Dashboard" },
    NavLink { to: "/dashboard/teachers", label: "Teachers" },
    NavLink { to: "/dashboard/classes", label: "Classes" },
    NavLink { to: "/dashboard/students", label: "Students" },
];

static TEACHER_NAV: [NavLink; 4] = [
    NavLink { to: "/dashboard", label: "Dashboard" },
    NavLink { to: "/dashboard/my-classes", label: "My Classes" },
    NavLink { to: "/dashboard/attendance", label: "Attendance" },
    NavLink { to: "/dashboard/grades", label: "Grades" },
];

/// One tile on a dashboard. `value: None` renders as a dash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: Option<u64>,
}

impl StatCard {
    pub fn new(title: &'static str, value: Option<u64>) -> Self {
        Self { title, value }
    }
}

impl Dashboard {
    pub fn role(&self) -> Role {
        match self {
            Dashboard::SuperAdmin => Role::SuperAdmin,
            Dashboard::SchoolAdmin => Role::SchoolAdmin,
            Dashboard::Teacher => Role::Teacher,
        }
    }

    pub fn nav(&self) -> &'static [NavLink] {
        match self {
            Dashboard::SuperAdmin => &SUPER_ADMIN_NAV,
            Dashboard::SchoolAdmin => &SCHOOL_ADMIN_NAV,
            Dashboard::Teacher => &TEACHER_NAV,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Dashboard::SuperAdmin => "Platform Overview",
            Dashboard::SchoolAdmin => "School Overview",
            Dashboard::Teacher => "My Overview",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::routes::{authorize, Route};
    use crate::session::Session;

    use super::*;

    #[test]
    fn every_role_has_its_own_dashboard() {
        assert_eq!(dispatch(Role::SuperAdmin), Dashboard::SuperAdmin);
        assert_eq!(dispatch(Role::SchoolAdmin), Dashboard::SchoolAdmin);
        assert_eq!(dispatch(Role::Teacher), Dashboard::Teacher);
        for role in Role::ALL {
            assert_eq!(dispatch(role).role(), role);
        }
    }

    #[test]
    fn nav_links_point_at_routes_the_role_may_open() {
        for role in Role::ALL {
            let session = Session {
                user_id: "u".into(),
                email: "u@campus.dev".into(),
                role,
                school_id: Some("s".into()),
                full_name: None,
            };
            for link in dispatch(role).nav() {
                let route = Route::ALL
                    .iter()
                    .find(|r| r.path() == link.to)
                    .unwrap_or_else(|| panic!("{} is not a route", link.to));
                assert!(authorize(route.required_roles(), Some(&session)).is_granted());
            }
        }
    }
}
