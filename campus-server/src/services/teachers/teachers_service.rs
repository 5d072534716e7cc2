use std::sync::Arc;

use campus_core::{CampusResult, Order, Query, Role, RoleAssignment, Table, TableBackend, TenantContext};

use crate::services::rows_into;

/// Teachers are the `teacher` role assignments of a school.
pub struct TeachersService {
    backend: Arc<dyn TableBackend>,
}

impl TeachersService {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self { backend }
    }

    pub async fn list(&self, ctx: &TenantContext) -> CampusResult<Vec<RoleAssignment>> {
        let rows = self
            .backend
            .select(
                Table::UserRoles,
                &Query::new()
                    .filter("school_id", ctx.school_id())
                    .filter("role", Role::Teacher.as_str())
                    .order(Order::asc("full_name")),
            )
            .await?;
        rows_into(rows)
    }
}

#[cfg(test)]
mod tests {
    use campus_core::MemoryBackend;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn only_teachers_of_the_school_are_listed() {
        let backend = Arc::new(MemoryBackend::new());
        let school = backend
            .insert(Table::Schools, json!({"name": "Oak", "slug": "oak", "school_code": "OAK111"}))
            .await
            .unwrap();
        let school_id = school["id"].as_str().unwrap();

        for (user, role, name) in [
            ("u1", "teacher", "Tom"),
            ("u2", "school_admin", "Ann"),
            ("u3", "teacher", "Beth"),
        ] {
            backend
                .insert(
                    Table::UserRoles,
                    json!({"user_id": user, "role": role, "school_id": school_id, "full_name": name}),
                )
                .await
                .unwrap();
        }

        let svc = TeachersService::new(backend);
        let names: Vec<Option<String>> = svc
            .list(&TenantContext::new(school_id))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.full_name)
            .collect();
        assert_eq!(names, [Some("Beth".to_string()), Some("Tom".to_string())]);
    }
}
