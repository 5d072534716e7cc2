use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::CampusResult;

/// Tables Campus talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Schools,
    Classes,
    Students,
    UserRoles,
}

impl Table {
    pub const ALL: [Table; 4] = [Table::Schools, Table::Classes, Table::Students, Table::UserRoles];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Schools => "schools",
            Table::Classes => "classes",
            Table::Students => "students",
            Table::UserRoles => "user_roles",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Value) -> bool {
        row.get(&self.column).unwrap_or(&Value::Null) == &self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// A select: equality filters, an optional order and an optional limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

/// The hosted table API, seen as an opaque CRUD service.
///
/// Rows travel as JSON objects keyed by column name. Inserts return the
/// stored row (with generated `id`/`created_at`), updates return every row
/// they touched. Write failures come back as [`crate::CampusError::Write`]
/// carrying the backend's own message.
#[async_trait]
pub trait TableBackend: Send + Sync {
    async fn select(&self, table: Table, query: &Query) -> CampusResult<Vec<Value>>;

    async fn insert(&self, table: Table, row: Value) -> CampusResult<Value>;

    async fn update(&self, table: Table, filters: &[Filter], patch: Value) -> CampusResult<Vec<Value>>;

    async fn count(&self, table: Table, filters: &[Filter]) -> CampusResult<u64>;
}
