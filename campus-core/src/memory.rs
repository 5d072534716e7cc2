//! In-memory table backend.
//!
//! Used for local mode and tests. It mimics the parts of the hosted
//! database the panels rely on: generated ids and timestamps, unique keys
//! on school codes and slugs, and foreign keys from classes, students and
//! role assignments to schools. Constraint violations come back as
//! `CampusError::Write` with Postgres-style messages.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::backend::{Filter, Order, Query, Table, TableBackend};
use crate::errors::{CampusError, CampusResult};

type Rows = HashMap<Table, Vec<Map<String, Value>>>;

#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<Rows>,
}

struct Unique {
    table: Table,
    column: &'static str,
}

struct ForeignKey {
    table: Table,
    column: &'static str,
    references: Table,
}

const UNIQUE: &[Unique] = &[
    Unique { table: Table::Schools, column: "school_code" },
    Unique { table: Table::Schools, column: "slug" },
    Unique { table: Table::UserRoles, column: "user_id" },
];

const FOREIGN_KEYS: &[ForeignKey] = &[
    ForeignKey { table: Table::Classes, column: "school_id", references: Table::Schools },
    ForeignKey { table: Table::Students, column: "school_id", references: Table::Schools },
    ForeignKey { table: Table::UserRoles, column: "school_id", references: Table::Schools },
];

fn not_null(table: Table) -> &'static [&'static str] {
    match table {
        Table::Schools => &["name", "slug"],
        Table::Classes => &["school_id", "name"],
        Table::Students => &["school_id", "full_name"],
        Table::UserRoles => &["user_id", "role"],
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_row(tables: &Rows, table: Table, row: &Map<String, Value>, skip_id: Option<&str>) -> CampusResult<()> {
        for column in not_null(table) {
            if row.get(*column).map_or(true, Value::is_null) {
                return Err(CampusError::write(format!(
                    "null value in column \"{column}\" of relation \"{table}\" violates not-null constraint"
                )));
            }
        }

        let empty = Vec::new();
        let existing = tables.get(&table).unwrap_or(&empty);

        for u in UNIQUE.iter().filter(|u| u.table == table) {
            let Some(value) = row.get(u.column).filter(|v| !v.is_null()) else {
                continue;
            };
            let clash = existing.iter().any(|other| {
                let same_row = skip_id.is_some() && other.get("id").and_then(Value::as_str) == skip_id;
                !same_row && other.get(u.column) == Some(value)
            });
            if clash {
                return Err(CampusError::write(format!(
                    "duplicate key value violates unique constraint \"{table}_{}_key\"",
                    u.column
                )));
            }
        }

        for fk in FOREIGN_KEYS.iter().filter(|fk| fk.table == table) {
            let Some(value) = row.get(fk.column).filter(|v| !v.is_null()) else {
                continue;
            };
            let found = tables
                .get(&fk.references)
                .map(|rows| rows.iter().any(|r| r.get("id") == Some(value)))
                .unwrap_or(false);
            if !found {
                return Err(CampusError::write(format!(
                    "insert or update on table \"{table}\" violates foreign key constraint \"{table}_{}_fkey\"",
                    fk.column
                )));
            }
        }

        Ok(())
    }

    fn matches_all(row: &Map<String, Value>, filters: &[Filter]) -> bool {
        filters
            .iter()
            .all(|f| row.get(&f.column).unwrap_or(&Value::Null) == &f.value)
    }
}

/// Letters compare without regard to case; byte order breaks ties so the
/// ordering stays total.
fn collate(x: &str, y: &str) -> Ordering {
    x.chars()
        .flat_map(char::to_lowercase)
        .cmp(y.chars().flat_map(char::to_lowercase))
        .then_with(|| x.cmp(y))
}

/// Nulls sort last ascending and first descending, as in Postgres.
fn compare(a: Option<&Value>, b: Option<&Value>, order: &Order) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    let ord = match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::String(x)), Some(Value::String(y))) => collate(x, y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    };
    if order.ascending {
        ord
    } else {
        ord.reverse()
    }
}

#[async_trait]
impl TableBackend for MemoryBackend {
    async fn select(&self, table: Table, query: &Query) -> CampusResult<Vec<Value>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&Map<String, Value>> = tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| Self::matches_all(r, &query.filters)).collect())
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| compare(a.get(&order.column), b.get(&order.column), order));
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|r| Value::Object(r.clone()))
            .collect())
    }

    async fn insert(&self, table: Table, row: Value) -> CampusResult<Value> {
        let Value::Object(mut row) = row else {
            return Err(CampusError::write("insert payload must be an object"));
        };

        if row.get("id").map_or(true, Value::is_null) {
            row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        row.entry("created_at")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        if table == Table::Schools {
            row.entry("is_active").or_insert(Value::Bool(true));
        }

        let mut tables = self.tables.write().await;
        Self::check_row(&tables, table, &row, None)
            .inspect_err(|e| debug!(%table, error = %e, "memory.insert rejected"))?;
        if let Some(id) = row.get("id") {
            let taken = tables
                .get(&table)
                .map(|rows| rows.iter().any(|r| r.get("id") == Some(id)))
                .unwrap_or(false);
            if taken {
                return Err(CampusError::write(format!(
                    "duplicate key value violates unique constraint \"{table}_pkey\""
                )));
            }
        }

        tables.entry(table).or_default().push(row.clone());
        Ok(Value::Object(row))
    }

    async fn update(&self, table: Table, filters: &[Filter], patch: Value) -> CampusResult<Vec<Value>> {
        let Value::Object(patch) = patch else {
            return Err(CampusError::write("update payload must be an object"));
        };

        let mut tables = self.tables.write().await;

        let current = tables.get(&table).cloned().unwrap_or_default();
        let mut next = Vec::with_capacity(current.len());
        let mut touched = Vec::new();

        for row in current {
            if !Self::matches_all(&row, filters) {
                next.push(row);
                continue;
            }
            let mut updated = row;
            for (k, v) in &patch {
                if k == "id" {
                    continue;
                }
                updated.insert(k.clone(), v.clone());
            }
            let id = updated.get("id").and_then(Value::as_str).map(str::to_string);
            Self::check_row(&tables, table, &updated, id.as_deref())?;
            touched.push(Value::Object(updated.clone()));
            next.push(updated);
        }

        tables.insert(table, next);
        Ok(touched)
    }

    async fn count(&self, table: Table, filters: &[Filter]) -> CampusResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| Self::matches_all(r, filters)).count())
            .unwrap_or(0) as u64)
    }
}
