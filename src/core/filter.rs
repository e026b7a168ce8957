//! Filter specification: predicates, the where clause, and its builder
//!
//! The builder walks the collection's allow-list table and only ever looks
//! up request keys that appear in it. Keys outside the table are handled by
//! the deployment-wide [`FilterPolicy`].

use crate::core::error::{QueryResult, ValidationError};
use crate::core::field::FieldValue;
use crate::core::record::{Collection, FieldSpec, Record};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::marker::PhantomData;

/// What to do with filter input the collection does not accept
///
/// Covers both unknown field names and operands that do not fit the
/// field's kind. One policy applies to every collection of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterPolicy {
    /// Fail the query with a validation error
    #[default]
    Reject,
    /// Drop the offending entry and run the query without it
    Ignore,
}

/// A constraint on a single field
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact equality
    Eq(FieldValue),
    /// Case-insensitive substring (string fields only)
    Contains(String),
    /// Inclusive range; either bound may be omitted
    Range {
        gte: Option<FieldValue>,
        lte: Option<FieldValue>,
    },
    /// Set membership
    In(Vec<FieldValue>),
}

impl Predicate {
    /// Evaluate against a record's value. Missing and null values never match.
    pub fn matches(&self, value: Option<&FieldValue>) -> bool {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return false;
        };

        match self {
            Predicate::Eq(expected) => value.compare(expected) == Ordering::Equal,
            Predicate::Contains(needle) => value.contains_text(needle),
            Predicate::Range { gte, lte } => {
                gte.as_ref()
                    .is_none_or(|low| value.compare(low) != Ordering::Less)
                    && lte
                        .as_ref()
                        .is_none_or(|high| value.compare(high) != Ordering::Greater)
            }
            Predicate::In(values) => values
                .iter()
                .any(|candidate| value.compare(candidate) == Ordering::Equal),
        }
    }
}

/// A predicate bound to an allow-listed field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: &'static str,
    pub predicate: Predicate,
}

/// Free-text search, OR'd across the collection's search fields
#[derive(Debug, Clone, PartialEq)]
pub struct SearchGroup {
    pub term: String,
    pub fields: Vec<&'static str>,
}

impl SearchGroup {
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.fields.iter().any(|field| {
            record
                .field_value(field)
                .is_some_and(|v| v.contains_text(&self.term))
        })
    }
}

/// The full filter: every field filter AND the optional search group
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WhereClause {
    pub filters: Vec<FieldFilter>,
    pub search: Option<SearchGroup>,
}

impl WhereClause {
    /// A clause that matches every record
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.search.is_none()
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.filters.iter().all(|filter| {
            let value = record.field_value(filter.field);
            filter.predicate.matches(value.as_ref())
        }) && self.search.as_ref().is_none_or(|group| group.matches(record))
    }
}

/// Builds a [`WhereClause`] for collection `C` from loosely typed input
///
/// # Operand forms
///
/// - scalar: equality (`"status": "open"`)
/// - array: set membership (`"status": ["open", "blocked"]`)
/// - `{"gte": a, "lte": b}`: inclusive range, either bound optional
/// - `{"contains": "text"}`: substring, string fields only
/// - `{"eq": v}` / `{"in": [..]}`: explicit forms of the first two
/// - `null`: no constraint
pub struct FilterBuilder<C: Collection> {
    policy: FilterPolicy,
    filters: Vec<FieldFilter>,
    search: Option<SearchGroup>,
    _marker: PhantomData<C>,
}

impl<C: Collection> FilterBuilder<C> {
    pub fn new(policy: FilterPolicy) -> Self {
        Self {
            policy,
            filters: Vec::new(),
            search: None,
            _marker: PhantomData,
        }
    }

    /// Add every entry of a request's filter map
    pub fn filters(mut self, input: &IndexMap<String, Value>) -> QueryResult<Self> {
        for key in input.keys() {
            if C::filter_spec(key).is_none() {
                self.refuse(ValidationError::InvalidFilterField { field: key.clone() })?;
            }
        }

        for spec in C::filterable_fields() {
            let Some(raw) = input.get(spec.name) else {
                continue;
            };

            match parse_predicate(spec, raw) {
                Ok(Some(predicate)) => self.filters.push(FieldFilter {
                    field: spec.name,
                    predicate,
                }),
                Ok(None) => {}
                Err(message) => self.refuse(ValidationError::InvalidFilterValue {
                    field: spec.name.to_string(),
                    message,
                })?,
            }
        }

        Ok(self)
    }

    /// Set the free-text search term; blank terms impose no constraint
    pub fn search(mut self, term: Option<&str>) -> Self {
        let term = term.map(str::trim).filter(|t| !t.is_empty());
        let fields = C::search_fields();

        self.search = match term {
            Some(term) if !fields.is_empty() => Some(SearchGroup {
                term: term.to_string(),
                fields: fields.to_vec(),
            }),
            Some(_) => {
                tracing::debug!(
                    collection = C::resource_name(),
                    "search ignored: collection has no search fields"
                );
                None
            }
            None => None,
        };

        self
    }

    pub fn build(self) -> WhereClause {
        WhereClause {
            filters: self.filters,
            search: self.search,
        }
    }

    fn refuse(&self, error: ValidationError) -> QueryResult<()> {
        match self.policy {
            FilterPolicy::Reject => Err(error.into()),
            FilterPolicy::Ignore => {
                tracing::warn!(collection = C::resource_name(), "dropping filter: {}", error);
                Ok(())
            }
        }
    }
}

/// Parse one filter operand. `Ok(None)` means "no constraint".
fn parse_predicate(spec: &FieldSpec, raw: &Value) -> Result<Option<Predicate>, String> {
    match raw {
        Value::Null => Ok(None),
        Value::Array(items) => parse_set(spec, items).map(Some),
        Value::Object(ops) => parse_operator_object(spec, ops),
        scalar => spec.kind.parse_json(scalar).map(|v| Some(Predicate::Eq(v))),
    }
}

fn parse_set(spec: &FieldSpec, items: &[Value]) -> Result<Predicate, String> {
    items
        .iter()
        .map(|item| spec.kind.parse_json(item))
        .collect::<Result<Vec<_>, _>>()
        .map(Predicate::In)
}

fn parse_operator_object(
    spec: &FieldSpec,
    ops: &serde_json::Map<String, Value>,
) -> Result<Option<Predicate>, String> {
    if let Some(unknown) = ops
        .keys()
        .find(|k| !matches!(k.as_str(), "eq" | "in" | "contains" | "gte" | "lte"))
    {
        return Err(format!("unsupported operator '{}'", unknown));
    }

    let range_only = ops.keys().all(|k| k == "gte" || k == "lte");
    if ops.len() > 1 && !range_only {
        return Err("operators cannot be combined, except gte with lte".to_string());
    }

    let is_range = ops.contains_key("gte") || ops.contains_key("lte");

    if is_range {
        if !spec.kind.is_ordered() {
            return Err("range bounds are not supported on this field".to_string());
        }
        let bound = |key: &str| -> Result<Option<FieldValue>, String> {
            match ops.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(v) => spec.kind.parse_json(v).map(Some),
            }
        };
        let gte = bound("gte")?;
        let lte = bound("lte")?;
        if gte.is_none() && lte.is_none() {
            return Ok(None);
        }
        return Ok(Some(Predicate::Range { gte, lte }));
    }

    if let Some(v) = ops.get("eq") {
        return match v {
            Value::Null => Ok(None),
            v => spec.kind.parse_json(v).map(|v| Some(Predicate::Eq(v))),
        };
    }

    if let Some(v) = ops.get("in") {
        return match v {
            Value::Null => Ok(None),
            Value::Array(items) => parse_set(spec, items).map(Some),
            _ => Err("'in' expects an array".to_string()),
        };
    }

    if let Some(v) = ops.get("contains") {
        if !spec.kind.is_textual() {
            return Err("'contains' is only supported on string fields".to_string());
        }
        return match v {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) => Ok(Some(Predicate::Contains(s.clone()))),
            _ => Err("'contains' expects a string".to_string()),
        };
    }

    // Empty object
    Ok(None)
}
