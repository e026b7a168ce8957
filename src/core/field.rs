//! Field value types and per-kind parsing of filter input

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use uuid::Uuid;

/// A polymorphic field value that can hold different types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a UUID if possible
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            FieldValue::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Total ordering over field values.
    ///
    /// Integers and floats compare numerically. Values of unrelated kinds
    /// are ordered by kind so that sorting a mixed column stays total.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        use FieldValue::*;

        match (self, other) {
            (String(a), String(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Integer(b)) => a.total_cmp(&(*b as f64)),
            (Boolean(a), Boolean(b)) => a.cmp(b),
            (Uuid(a), Uuid(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Null, Null) => Ordering::Equal,
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    /// Case-insensitive substring match, only meaningful for strings
    pub fn contains_text(&self, needle: &str) -> bool {
        match self {
            FieldValue::String(s) => s.to_lowercase().contains(&needle.to_lowercase()),
            _ => false,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Boolean(_) => 1,
            FieldValue::Integer(_) | FieldValue::Float(_) => 2,
            FieldValue::String(_) => 3,
            FieldValue::Uuid(_) => 4,
            FieldValue::DateTime(_) => 5,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// The declared type of a filterable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Uuid,
    DateTime,
}

impl FieldKind {
    /// Parse a JSON filter operand into a value of this kind
    ///
    /// Returns a human-readable reason when the operand does not fit.
    pub fn parse_json(&self, value: &Value) -> Result<FieldValue, String> {
        match self {
            FieldKind::String => value
                .as_str()
                .map(|s| FieldValue::String(s.to_string()))
                .ok_or_else(|| format!("expected a string, got {}", json_type(value))),
            FieldKind::Integer => match value {
                Value::Number(n) => n
                    .as_i64()
                    .map(FieldValue::Integer)
                    .ok_or_else(|| format!("expected an integer, got {}", n)),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(FieldValue::Integer)
                    .map_err(|_| format!("expected an integer, got '{}'", s)),
                other => Err(format!("expected an integer, got {}", json_type(other))),
            },
            FieldKind::Float => value
                .as_f64()
                .map(FieldValue::Float)
                .ok_or_else(|| format!("expected a number, got {}", json_type(value))),
            FieldKind::Boolean => match value {
                Value::Bool(b) => Ok(FieldValue::Boolean(*b)),
                Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(FieldValue::Boolean(true)),
                Value::String(s) if s.eq_ignore_ascii_case("false") => {
                    Ok(FieldValue::Boolean(false))
                }
                other => Err(format!("expected a boolean, got {}", json_type(other))),
            },
            FieldKind::Uuid => value
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .map(FieldValue::Uuid)
                .ok_or_else(|| "expected a UUID string".to_string()),
            FieldKind::DateTime => value
                .as_str()
                .and_then(parse_datetime)
                .map(FieldValue::DateTime)
                .ok_or_else(|| "expected an RFC 3339 timestamp or YYYY-MM-DD date".to_string()),
        }
    }

    /// Whether substring matching applies to this kind
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldKind::String)
    }

    /// Whether `gte`/`lte` bounds apply to this kind
    pub fn is_ordered(&self) -> bool {
        !matches!(self, FieldKind::Boolean)
    }
}

/// Parse an RFC 3339 timestamp, or a bare date taken as midnight UTC
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
