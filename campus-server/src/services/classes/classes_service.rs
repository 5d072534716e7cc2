use std::sync::Arc;

use campus_core::validate::blank_to_none;
use campus_core::{ClassRecord, CampusResult, Order, Query, Table, TableBackend, TenantContext};
use serde_json::json;
use tracing::info;

use super::CreateClass;
use crate::services::rows_into;

/// Classes of one school. The school always comes from the tenant
/// context, never from the form.
pub struct ClassesService {
    backend: Arc<dyn TableBackend>,
}

impl ClassesService {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self { backend }
    }

    pub async fn list(&self, ctx: &TenantContext) -> CampusResult<Vec<ClassRecord>> {
        let rows = self
            .backend
            .select(
                Table::Classes,
                &Query::new()
                    .filter("school_id", ctx.school_id())
                    .order(Order::asc("name")),
            )
            .await?;
        rows_into(rows)
    }

    pub async fn create(&self, ctx: &TenantContext, form: CreateClass) -> CampusResult<ClassRecord> {
        let row = self
            .backend
            .insert(
                Table::Classes,
                json!({
                    "school_id": ctx.school_id(),
                    "name": form.name.trim(),
                    "grade_level": blank_to_none(form.grade_level),
                    "section": blank_to_none(form.section),
                }),
            )
            .await?;

        let class: ClassRecord = serde_json::from_value(row)?;
        info!(school_id = %ctx.school_id(), class_id = %class.id, "classes.create");
        Ok(class)
    }
}
