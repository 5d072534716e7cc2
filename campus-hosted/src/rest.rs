// PostgREST-backed TableBackend.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use campus_core::{CampusError, CampusResult, Filter, Query, Table, TableBackend};

use crate::options::HostedOptions;

pub struct PostgrestBackend {
    client: Client,
    options: HostedOptions,
}

impl PostgrestBackend {
    pub fn new(options: HostedOptions) -> CampusResult<Self> {
        options.validate()?;
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| CampusError::Config(format!("http client: {e}")))?;
        Ok(Self { client, options })
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.options.service_key)
            .bearer_auth(&self.options.service_key)
    }

    async fn send(&self, builder: RequestBuilder, table: Table) -> CampusResult<Response> {
        self.request(builder).send().await.map_err(|e| {
            debug!(%table, error = %e, "postgrest: transport failure");
            CampusError::Network(e.to_string())
        })
    }
}

/// Render a filter value the way PostgREST expects after `eq.`.
pub(crate) fn filter_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Query-string pairs for filters, order and limit.
pub(crate) fn query_params(filters: &[Filter], query: Option<&Query>) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = filters
        .iter()
        .map(|f| match &f.value {
            Value::Null => (f.column.clone(), "is.null".to_string()),
            v => (f.column.clone(), format!("eq.{}", filter_literal(v))),
        })
        .collect();

    if let Some(q) = query {
        if let Some(order) = &q.order {
            let dir = if order.ascending { "asc" } else { "desc" };
            params.push(("order".into(), format!("{}.{dir}", order.column)));
        }
        if let Some(n) = q.limit {
            params.push(("limit".into(), n.to_string()));
        }
    }
    params
}

/// Total from a `Content-Range` header: `0-9/42` or `*/0`.
pub(crate) fn parse_content_range(header: &str) -> Option<u64> {
    let (_, total) = header.rsplit_once('/')?;
    total.trim().parse().ok()
}

/// PostgREST error bodies carry `message` (and sometimes `details`/`hint`).
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("{status}: {body}"))
}

async fn read_rows(resp: Response, write: bool) -> CampusResult<Vec<Value>> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| CampusError::Network(e.to_string()))?;

    if !status.is_success() {
        let msg = error_message(status, &body);
        return Err(if write {
            CampusError::Write(msg)
        } else {
            CampusError::Backend(msg)
        });
    }

    match serde_json::from_str::<Value>(&body)? {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        row => Ok(vec![row]),
    }
}

#[async_trait]
impl TableBackend for PostgrestBackend {
    async fn select(&self, table: Table, query: &Query) -> CampusResult<Vec<Value>> {
        let params = query_params(&query.filters, Some(query));
        let builder = self
            .client
            .get(self.options.rest_url(table.name()))
            .query(&[("select", "*")])
            .query(&params);
        read_rows(self.send(builder, table).await?, false).await
    }

    async fn insert(&self, table: Table, row: Value) -> CampusResult<Value> {
        let builder = self
            .client
            .post(self.options.rest_url(table.name()))
            .header("Prefer", "return=representation")
            .json(&row);
        read_rows(self.send(builder, table).await?, true)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CampusError::write(format!("insert into {table} returned no row")))
    }

    async fn update(&self, table: Table, filters: &[Filter], patch: Value) -> CampusResult<Vec<Value>> {
        if filters.is_empty() {
            return Err(CampusError::internal(format!("refusing unfiltered update of {table}")));
        }
        let builder = self
            .client
            .patch(self.options.rest_url(table.name()))
            .query(&query_params(filters, None))
            .header("Prefer", "return=representation")
            .json(&patch);
        read_rows(self.send(builder, table).await?, true).await
    }

    async fn count(&self, table: Table, filters: &[Filter]) -> CampusResult<u64> {
        let builder = self
            .client
            .head(self.options.rest_url(table.name()))
            .query(&[("select", "id")])
            .query(&query_params(filters, None))
            .header("Prefer", "count=exact");
        let resp = self.send(builder, table).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CampusError::Backend(format!("count {table}: {status}")));
        }
        resp.headers()
            .get("content-range")
            .and_then(|h| h.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| CampusError::Backend(format!("count {table}: no Content-Range")))
    }
}

#[cfg(test)]
mod tests {
    use campus_core::Order;
    use serde_json::json;

    use super::*;

    #[test]
    fn filters_become_eq_params() {
        let q = Query::new()
            .filter("school_id", "abc")
            .filter("is_active", true)
            .order(Order::asc("name"))
            .limit(1);
        let params = query_params(&q.filters, Some(&q));
        assert_eq!(
            params,
            vec![
                ("school_id".to_string(), "eq.abc".to_string()),
                ("is_active".to_string(), "eq.true".to_string()),
                ("order".to_string(), "name.asc".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn null_filters_use_is_null() {
        let params = query_params(&[Filter::eq("school_id", Value::Null)], None);
        assert_eq!(params[0].1, "is.null");
    }

    #[test]
    fn content_range_totals() {
        assert_eq!(parse_content_range("0-9/42"), Some(42));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("*/*"), None);
    }

    #[test]
    fn postgrest_error_message_is_extracted() {
        let body = json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"schools_slug_key\"",
        })
        .to_string();
        let msg = error_message(StatusCode::CONFLICT, &body);
        assert!(msg.starts_with("duplicate key value"));
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "oops"), "502 Bad Gateway: oops");
    }
}
