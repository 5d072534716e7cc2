//! Form validation on top of the `validator` crate.
//!
//! Forms arrive as JSON; they are parsed, validated, and every failure is
//! flattened into `{ "field.path": ["message", ...] }` inside an
//! `Unprocessable` error.

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::errors::{CampusError, CampusResult};

fn friendly_message(code: &str) -> Option<&'static str> {
    match code {
        "required" => Some("is required"),
        "email" => Some("must be a valid email"),
        "length" => Some("has invalid length"),
        _ => None,
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn push_errors(out: &mut Map<String, Value>, prefix: &str, errs: &ValidationErrors) {
    for (field, kind) in errs.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let key = join_path(prefix, field);
                let slot = out
                    .entry(key)
                    .or_insert_with(|| Value::Array(Vec::new()));
                for e in field_errors {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .or_else(|| friendly_message(&e.code).map(|m| format!("{field} {m}")))
                        .unwrap_or_else(|| e.code.to_string());
                    if let Value::Array(items) = slot {
                        items.push(Value::String(msg));
                    }
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                push_errors(out, &join_path(prefix, field), nested.as_ref());
            }
            ValidationErrorsKind::List(items) => {
                let base = join_path(prefix, field);
                for (idx, nested) in items {
                    push_errors(out, &format!("{base}[{idx}]"), nested.as_ref());
                }
            }
        }
    }
}

/// Convert `validator` errors into an `Unprocessable` error. The first
/// field message becomes the headline so a single inline banner still
/// reads well.
pub fn to_campus_error(errs: &ValidationErrors, fallback: &str) -> CampusError {
    let mut out = Map::new();
    push_errors(&mut out, "", errs);

    let mut keys: Vec<&String> = out.keys().collect();
    keys.sort();
    let headline = keys
        .first()
        .and_then(|k| out.get(*k))
        .and_then(|v| v.get(0))
        .and_then(|v| v.as_str())
        .unwrap_or(fallback)
        .to_string();

    CampusError::Unprocessable {
        message: headline,
        errors: Value::Object(out),
    }
}

/// Parse and validate a JSON form.
pub fn validate_form<T>(data: Value, error_message: &str) -> CampusResult<T>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_json::from_value(data).map_err(|e| CampusError::Unprocessable {
        message: error_message.to_string(),
        errors: json!({ "_schema": [e.to_string()] }),
    })?;

    parsed
        .validate()
        .map_err(|e| to_campus_error(&e, error_message))?;

    Ok(parsed)
}

/// `custom` validator for required text: whitespace alone does not count.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Empty and whitespace-only optional inputs are stored as null.
pub fn blank_to_none(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
