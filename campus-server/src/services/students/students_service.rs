use std::sync::Arc;

use campus_core::validate::blank_to_none;
use campus_core::{CampusResult, Order, Query, StudentRecord, Table, TableBackend, TenantContext};
use serde_json::json;
use tracing::info;

use super::CreateStudent;
use crate::services::rows_into;

pub struct StudentsService {
    backend: Arc<dyn TableBackend>,
}

impl StudentsService {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self { backend }
    }

    pub async fn list(&self, ctx: &TenantContext) -> CampusResult<Vec<StudentRecord>> {
        let rows = self
            .backend
            .select(
                Table::Students,
                &Query::new()
                    .filter("school_id", ctx.school_id())
                    .order(Order::asc("full_name")),
            )
            .await?;
        rows_into(rows)
    }

    pub async fn create(&self, ctx: &TenantContext, form: CreateStudent) -> CampusResult<StudentRecord> {
        let row = self
            .backend
            .insert(
                Table::Students,
                json!({
                    "school_id": ctx.school_id(),
                    "full_name": form.full_name.trim(),
                    "roll_number": blank_to_none(form.roll_number),
                    "email": blank_to_none(form.email),
                    "phone": blank_to_none(form.phone),
                }),
            )
            .await?;

        let student: StudentRecord = serde_json::from_value(row)?;
        info!(school_id = %ctx.school_id(), student_id = %student.id, "students.create");
        Ok(student)
    }
}

#[cfg(test)]
mod tests {
    use campus_core::MemoryBackend;

    use super::*;

    #[tokio::test]
    async fn students_are_scoped_and_sorted() {
        let backend = Arc::new(MemoryBackend::new());
        let school = backend
            .insert(Table::Schools, json!({"name": "Oak", "slug": "oak", "school_code": "OAK111"}))
            .await
            .unwrap();
        let ctx = TenantContext::new(school["id"].as_str().unwrap());
        let svc = StudentsService::new(backend);

        for name in ["Zed Z", "Amy A"] {
            svc.create(
                &ctx,
                CreateStudent {
                    full_name: name.into(),
                    roll_number: Some(" ".into()),
                    email: None,
                    phone: None,
                },
            )
            .await
            .unwrap();
        }

        let list = svc.list(&ctx).await.unwrap();
        assert_eq!(list[0].full_name, "Amy A");
        assert_eq!(list[1].full_name, "Zed Z");
        assert_eq!(list[0].roll_number, None);
        assert!(svc.list(&TenantContext::new("other")).await.unwrap().is_empty());
    }
}
