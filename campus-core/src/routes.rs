//! Route table and the role guard.

use crate::session::{Role, Session};

/// Where a denied request is sent.
pub const LOGIN_REDIRECT: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Login,
    SignUp,
    SchoolLogin,
    Dashboard,
    Schools,
    Analytics,
    Teachers,
    Classes,
    Students,
    MyClasses,
    Attendance,
    Grades,
}

impl Route {
    pub const ALL: [Route; 13] = [
        Route::Landing,
        Route::Login,
        Route::SignUp,
        Route::SchoolLogin,
        Route::Dashboard,
        Route::Schools,
        Route::Analytics,
        Route::Teachers,
        Route::Classes,
        Route::Students,
        Route::MyClasses,
        Route::Attendance,
        Route::Grades,
    ];

    /// Path pattern, in axum's `{param}` syntax.
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::SignUp => "/signup",
            Route::SchoolLogin => "/{school_slug}/login",
            Route::Dashboard => "/dashboard",
            Route::Schools => "/dashboard/schools",
            Route::Analytics => "/dashboard/analytics",
            Route::Teachers => "/dashboard/teachers",
            Route::Classes => "/dashboard/classes",
            Route::Students => "/dashboard/students",
            Route::MyClasses => "/dashboard/my-classes",
            Route::Attendance => "/dashboard/attendance",
            Route::Grades => "/dashboard/grades",
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Route::Landing | Route::Login | Route::SignUp | Route::SchoolLogin
        )
    }

    /// `None` means any signed-in role. Public routes also answer `None`;
    /// check [`Route::is_public`] first.
    pub fn required_roles(&self) -> Option<&'static [Role]> {
        match self {
            Route::Landing | Route::Login | Route::SignUp | Route::SchoolLogin | Route::Dashboard => None,
            Route::Schools | Route::Analytics => Some(&[Role::SuperAdmin]),
            Route::Teachers | Route::Classes | Route::Students => Some(&[Role::SchoolAdmin]),
            Route::MyClasses | Route::Attendance | Route::Grades => Some(&[Role::Teacher]),
        }
    }
}

/// Outcome of the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access<'a> {
    Granted(&'a Session),
    Redirect(&'static str),
}

impl Access<'_> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }
}

/// Grant iff there is a session and its role is allowed (or no roles are
/// required). Everything else redirects to the login route.
pub fn authorize<'a>(required: Option<&[Role]>, session: Option<&'a Session>) -> Access<'a> {
    match (session, required) {
        (None, _) => Access::Redirect(LOGIN_REDIRECT),
        (Some(s), None) => Access::Granted(s),
        (Some(s), Some(roles)) if s.has_role(roles) => Access::Granted(s),
        (Some(_), Some(_)) => Access::Redirect(LOGIN_REDIRECT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            user_id: "u".into(),
            email: "u@campus.dev".into(),
            role,
            school_id: role.is_school_scoped().then(|| "s1".to_string()),
            full_name: None,
        }
    }

    #[test]
    fn guard_grants_iff_role_is_required() {
        for route in Route::ALL.iter().filter(|r| !r.is_public()) {
            for role in Role::ALL {
                let s = session(role);
                let access = authorize(route.required_roles(), Some(&s));
                let expected = route.required_roles().map_or(true, |roles| roles.contains(&role));
                assert_eq!(access.is_granted(), expected, "{route:?} as {role}");
            }
        }
    }

    #[test]
    fn missing_session_always_redirects_to_login() {
        for route in Route::ALL {
            assert_eq!(
                authorize(route.required_roles(), None),
                Access::Redirect(LOGIN_REDIRECT)
            );
        }
    }

    #[test]
    fn dashboard_admits_every_role() {
        for role in Role::ALL {
            let s = session(role);
            assert!(authorize(Route::Dashboard.required_roles(), Some(&s)).is_granted());
        }
    }
}
