use std::sync::Arc;

use campus_core::validate::blank_to_none;
use campus_core::{
    generate_code, slugify, CampusError, CampusResult, Filter, Order, Query, School, SchoolCode,
    Table, TableBackend,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::CreateSchool;
use crate::services::rows_into;

/// Candidates tried before giving up on a free school code.
pub const CODE_ATTEMPTS: usize = 5;

pub struct SchoolsService {
    backend: Arc<dyn TableBackend>,
}

impl SchoolsService {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self { backend }
    }

    pub async fn list(&self) -> CampusResult<Vec<School>> {
        let rows = self
            .backend
            .select(Table::Schools, &Query::new().order(Order::asc("name")))
            .await?;
        rows_into(rows)
    }

    async fn get(&self, id: &str) -> CampusResult<School> {
        let rows = self
            .backend
            .select(Table::Schools, &Query::new().filter("id", id).limit(1))
            .await?;
        rows_into::<School>(rows)?
            .pop()
            .ok_or_else(|| CampusError::not_found(format!("No school found for id '{id}'")))
    }

    /// Resolve a typed-in school code. Exactly one school must match.
    pub async fn find_by_code(&self, input: &str) -> CampusResult<School> {
        let code = SchoolCode::parse(input)?;
        let rows = self
            .backend
            .select(
                Table::Schools,
                &Query::new().filter("school_code", code.as_str()).limit(2),
            )
            .await?;

        let mut schools: Vec<School> = rows_into(rows)?;
        if schools.len() != 1 {
            debug!(code = %code, matches = schools.len(), "schools.find_by_code: no unique match");
            return Err(CampusError::InvalidCode);
        }
        Ok(schools.remove(0))
    }

    pub async fn find_by_slug(&self, slug: &str) -> CampusResult<School> {
        let rows = self
            .backend
            .select(Table::Schools, &Query::new().filter("slug", slug).limit(1))
            .await?;
        rows_into::<School>(rows)?
            .pop()
            .ok_or_else(|| CampusError::not_found(format!("No school found at '/{slug}'")))
    }

    pub async fn slug_taken(&self, slug: &str) -> CampusResult<bool> {
        Ok(self
            .backend
            .count(Table::Schools, &[Filter::eq("slug", slug)])
            .await?
            > 0)
    }

    /// Draw codes until one is unused, at most [`CODE_ATTEMPTS`] times.
    pub async fn allocate_code(&self, name: &str) -> CampusResult<SchoolCode> {
        for attempt in 1..=CODE_ATTEMPTS {
            let code = generate_code(name, &mut rand::thread_rng());
            let taken = self
                .backend
                .count(Table::Schools, &[Filter::eq("school_code", code.as_str())])
                .await?;
            if taken == 0 {
                return Ok(code);
            }
            debug!(code = %code, attempt, "schools.allocate_code: collision");
        }
        Err(CampusError::conflict(
            "Could not allocate a unique school code. Please try again.",
        ))
    }

    /// Insert a school with a derived slug and a freshly allocated code.
    pub async fn create(&self, form: CreateSchool) -> CampusResult<School> {
        let (name, slug) = self.claim_slug(&form.name).await?;
        let code = self.allocate_code(&name).await?;
        self.insert(name, slug, code, form).await
    }

    /// Insert a school under a code allocated beforehand.
    pub async fn create_with_code(&self, form: CreateSchool, code: SchoolCode) -> CampusResult<School> {
        let (name, slug) = self.claim_slug(&form.name).await?;
        self.insert(name, slug, code, form).await
    }

    /// Trimmed name and its slug, if that slug is free.
    async fn claim_slug(&self, name: &str) -> CampusResult<(String, String)> {
        let name = name.trim().to_string();
        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(CampusError::invalid_field(
                "name",
                "School name must contain letters or digits",
            ));
        }
        if self.slug_taken(&slug).await? {
            return Err(CampusError::conflict(format!(
                "A school named '{name}' already exists"
            )));
        }
        Ok((name, slug))
    }

    async fn insert(&self, name: String, slug: String, code: SchoolCode, form: CreateSchool) -> CampusResult<School> {
        let row = self
            .backend
            .insert(
                Table::Schools,
                json!({
                    "name": name,
                    "slug": slug,
                    "school_code": code.as_str(),
                    "email": blank_to_none(form.email),
                    "phone": blank_to_none(form.phone),
                    "address": blank_to_none(form.address),
                    "school_type": form.school_type,
                }),
            )
            .await?;

        let school: School = serde_json::from_value(row)?;
        info!(school_id = %school.id, code = %school.school_code, "schools.create");
        Ok(school)
    }

    /// Flip `is_active` on one school.
    pub async fn toggle_active(&self, id: &str) -> CampusResult<School> {
        let current = self.get(id).await?;
        let rows = self
            .backend
            .update(
                Table::Schools,
                &[Filter::eq("id", id)],
                json!({ "is_active": !current.is_active }),
            )
            .await?;

        let school = rows_into::<School>(rows)?
            .pop()
            .ok_or_else(|| CampusError::not_found(format!("No school found for id '{id}'")))?;
        info!(school_id = %school.id, is_active = school.is_active, "schools.toggle_active");
        Ok(school)
    }
}

/// `{ school_id, school_name }` carried to the role login page.
pub fn login_state(school: &School) -> Value {
    json!({ "school_id": school.id, "school_name": school.name })
}
