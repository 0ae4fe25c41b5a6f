// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Query Normalization
//!
//! List endpoints accept `offset`, `limit`, and `fields` query
//! parameters. Raw values are normalized into a bounded [`PageWindow`]
//! before any storage access:
//!
//! - `offset` outside 0-1000 (or non-numeric) resets to 0
//! - `limit` outside 0-5 (or non-numeric) resets to 3
//! - `fields` has commas rewritten to spaces; absent means all fields
//!
//! Out-of-range values reset to the default rather than clamping to the
//! nearest boundary, so `limit=100` yields 3 results, not 5.

use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

const OFFSET_MIN: i64 = 0;
const OFFSET_MAX: i64 = 1000;
const LIMIT_MIN: i64 = 0;
const LIMIT_MAX: i64 = 5;
const DEFAULT_LIMIT: i64 = 3;

/// Pagination query parameters as they arrive on the wire.
///
/// Values are kept as raw strings so that normalization, not
/// deserialization, decides what a bad value means. Normalization never
/// fails.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RawPageParams {
    /// Records to skip (0-1000; out of range resets to 0).
    pub offset: Option<String>,
    /// Records to return (0-5; out of range resets to 3).
    pub limit: Option<String>,
    /// Field names to project, separated by commas or spaces.
    pub fields: Option<String>,
}

impl RawPageParams {
    /// Normalize into a bounded [`PageWindow`].
    pub fn normalize(&self) -> PageWindow {
        PageWindow {
            offset: normalize_offset(self.offset.as_deref()),
            limit: normalize_limit(self.limit.as_deref()),
            fields: normalize_fields(self.fields.as_deref()),
        }
    }
}

/// Bounded pagination window applied to list operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Records to skip.
    pub offset: usize,
    /// Maximum records to return. Zero means no cap.
    pub limit: usize,
    /// Space-separated projection field names; empty selects all fields.
    pub fields: String,
}

impl Default for PageWindow {
    fn default() -> Self {
        RawPageParams::default().normalize()
    }
}

fn normalize_offset(raw: Option<&str>) -> usize {
    match raw.and_then(|s| s.parse::<i64>().ok()) {
        Some(n) if (OFFSET_MIN..=OFFSET_MAX).contains(&n) => n as usize,
        _ => OFFSET_MIN as usize,
    }
}

fn normalize_limit(raw: Option<&str>) -> usize {
    match raw.and_then(|s| s.parse::<i64>().ok()) {
        Some(n) if (LIMIT_MIN..=LIMIT_MAX).contains(&n) => n as usize,
        _ => DEFAULT_LIMIT as usize,
    }
}

fn normalize_fields(raw: Option<&str>) -> String {
    match raw {
        Some(fields) => fields.replace(',', " "),
        None => String::new(),
    }
}

/// Apply a field projection to one serialized record.
///
/// An empty field list returns the value unchanged. Otherwise only the named
/// top-level fields are retained; unknown names are ignored. Non-object
/// values pass through untouched.
pub fn apply_projection(value: Value, fields: &str) -> Value {
    if fields.trim().is_empty() {
        return value;
    }

    match value {
        Value::Object(map) => {
            let wanted: Vec<&str> = fields.split_whitespace().collect();
            let filtered = map
                .into_iter()
                .filter(|(key, _)| wanted.contains(&key.as_str()))
                .collect();
            Value::Object(filtered)
        }
        other => other,
    }
}

/// Serialize records and apply the window's projection to each.
pub fn project_records<T: serde::Serialize>(
    records: &[T],
    fields: &str,
) -> Result<Vec<Value>, serde_json::Error> {
    records
        .iter()
        .map(|record| serde_json::to_value(record).map(|value| apply_projection(value, fields)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(offset: Option<&str>, limit: Option<&str>, fields: Option<&str>) -> RawPageParams {
        RawPageParams {
            offset: offset.map(String::from),
            limit: limit.map(String::from),
            fields: fields.map(String::from),
        }
    }

    #[test]
    fn in_range_values_pass_through_unchanged() {
        let window = params(Some("5"), Some("4"), None).normalize();
        assert_eq!(window.offset, 5);
        assert_eq!(window.limit, 4);
    }

    #[test]
    fn boundary_values_are_accepted() {
        let window = params(Some("1000"), Some("5"), None).normalize();
        assert_eq!(window.offset, 1000);
        assert_eq!(window.limit, 5);

        let window = params(Some("0"), Some("0"), None).normalize();
        assert_eq!(window.offset, 0);
        assert_eq!(window.limit, 0);
    }

    #[test]
    fn absent_values_use_defaults() {
        let window = params(None, None, None).normalize();
        assert_eq!(window.offset, 0);
        assert_eq!(window.limit, 3);
        assert_eq!(window.fields, "");
    }

    #[test]
    fn out_of_range_offset_resets_to_zero() {
        assert_eq!(params(Some("1001"), None, None).normalize().offset, 0);
        assert_eq!(params(Some("-1"), None, None).normalize().offset, 0);
    }

    #[test]
    fn out_of_range_limit_resets_to_default_not_max() {
        // A huge limit goes back to 3, it is not clamped to 5.
        assert_eq!(params(None, Some("100"), None).normalize().limit, 3);
        assert_eq!(params(None, Some("6"), None).normalize().limit, 3);
        assert_eq!(params(None, Some("-1"), None).normalize().limit, 3);
    }

    #[test]
    fn non_numeric_values_reset_to_defaults() {
        let window = params(Some("abc"), Some("ten"), None).normalize();
        assert_eq!(window.offset, 0);
        assert_eq!(window.limit, 3);

        let window = params(Some("1.5"), Some("2.0"), None).normalize();
        assert_eq!(window.offset, 0);
        assert_eq!(window.limit, 3);
    }

    #[test]
    fn fields_commas_become_spaces() {
        let window = params(None, None, Some("name,email,age")).normalize();
        assert_eq!(window.fields, "name email age");

        let window = params(None, None, Some("name, email")).normalize();
        assert_eq!(window.fields, "name  email");
    }

    #[test]
    fn projection_retains_only_named_fields() {
        let record = json!({"id": "u1", "name": "Ada", "email": "ada@example.com"});
        let projected = apply_projection(record, "name email");
        assert_eq!(
            projected,
            json!({"name": "Ada", "email": "ada@example.com"})
        );
    }

    #[test]
    fn empty_projection_returns_value_unchanged() {
        let record = json!({"id": "u1", "name": "Ada"});
        assert_eq!(apply_projection(record.clone(), ""), record);
        assert_eq!(apply_projection(record.clone(), "   "), record);
    }

    #[test]
    fn projection_ignores_unknown_names() {
        let record = json!({"id": "u1", "name": "Ada"});
        let projected = apply_projection(record, "name nope");
        assert_eq!(projected, json!({"name": "Ada"}));
    }

    #[test]
    fn projection_passes_non_objects_through() {
        assert_eq!(apply_projection(json!(42), "name"), json!(42));
    }

    #[test]
    fn project_records_applies_window_fields() {
        #[derive(serde::Serialize)]
        struct Row {
            id: u32,
            name: &'static str,
        }

        let rows = vec![
            Row { id: 1, name: "a" },
            Row { id: 2, name: "b" },
        ];
        let projected = project_records(&rows, "name").unwrap();
        assert_eq!(projected, vec![json!({"name": "a"}), json!({"name": "b"})]);
    }
}
